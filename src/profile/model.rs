//! Classifiers of the ensemble and their persistence.
//!
//! A classifier maps the `(N, D)` embedding of N residues to N probabilities
//! of belonging to an aggregation-prone region. The crate ships two model
//! families, both deserialized from json; any other model can take part in
//! scoring by implementing [`ScoringModel`].
use crate::profile::ensemble::score_batched;
use crate::shared::errors::{AprError, Stage};
use crate::shared::utils::sigmoid;
use anyhow::{anyhow, Context, Result};
use enum_dispatch::enum_dispatch;
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView2};
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[enum_dispatch]
pub trait ScoringModel {
    /// Width D of the feature vectors the model expects
    fn n_features(&self) -> usize;

    /// Probability of the positive class for every row of `x`
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>>;
}

// boxed models, so that user types can be mixed in one slice
impl<T: ScoringModel + ?Sized> ScoringModel for Box<T> {
    fn n_features(&self) -> usize {
        (**self).n_features()
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        (**self).predict_proba(x)
    }
}

/// Logistic regression, `p = sigmoid(x . w + b)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    pub fn new(coefficients: Array1<f64>, intercept: f64) -> Result<LogisticModel> {
        let model = LogisticModel {
            coefficients,
            intercept,
        };
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<()> {
        if self.coefficients.is_empty() {
            return Err(anyhow!("A logistic model needs at least one coefficient"));
        }
        Ok(())
    }
}

impl ScoringModel for LogisticModel {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        check_width(x, self.n_features())?;
        Ok(x.dot(&self.coefficients).mapv(|z| sigmoid(z + self.intercept)))
    }
}

/// Perceptron with one ReLU hidden layer and a sigmoid output unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MlpModel {
    // D x H
    pub hidden_weights: Array2<f64>,
    // H
    pub hidden_bias: Array1<f64>,
    // H
    pub output_weights: Array1<f64>,
    pub output_bias: f64,
}

impl MlpModel {
    pub fn new(
        hidden_weights: Array2<f64>,
        hidden_bias: Array1<f64>,
        output_weights: Array1<f64>,
        output_bias: f64,
    ) -> Result<MlpModel> {
        let model = MlpModel {
            hidden_weights,
            hidden_bias,
            output_weights,
            output_bias,
        };
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<()> {
        let (d, h) = self.hidden_weights.dim();
        if d == 0 || h == 0 {
            return Err(anyhow!("Empty hidden layer ({} x {})", d, h));
        }
        if self.hidden_bias.len() != h || self.output_weights.len() != h {
            return Err(anyhow!(
                "Inconsistent layer sizes: {} hidden units, {} biases, {} output weights",
                h,
                self.hidden_bias.len(),
                self.output_weights.len()
            ));
        }
        Ok(())
    }
}

impl ScoringModel for MlpModel {
    fn n_features(&self) -> usize {
        self.hidden_weights.nrows()
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        check_width(x, self.n_features())?;
        let hidden = (x.dot(&self.hidden_weights) + &self.hidden_bias).mapv_into(|v| v.max(0.));
        Ok(hidden
            .dot(&self.output_weights)
            .mapv(|z| sigmoid(z + self.output_bias)))
    }
}

fn check_width(x: ArrayView2<'_, f64>, expected: usize) -> Result<()> {
    if x.ncols() != expected {
        return Err(AprError::shape_mismatch(
            Stage::Scoring,
            expected,
            x.ncols(),
            "features per residue",
        ))?;
    }
    Ok(())
}

#[enum_dispatch(ScoringModel)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Logistic(LogisticModel),
    Mlp(MlpModel),
}

impl Classifier {
    /// Layer sizes of a deserialized model
    pub fn check(&self) -> Result<()> {
        match self {
            Classifier::Logistic(m) => m.check(),
            Classifier::Mlp(m) => m.check(),
        }
    }

    pub fn load_json(path: &Path) -> Result<Classifier> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Error reading the model file {}", path.display()))?;
        let model: Classifier = serde_json::from_str(&content)
            .with_context(|| format!("Invalid model file {}", path.display()))?;
        model
            .check()
            .with_context(|| format!("Invalid model file {}", path.display()))?;
        Ok(model)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)
            .with_context(|| format!("Error writing the model file {}", path.display()))?;
        Ok(())
    }
}

/// Ordered, non-empty set of classifiers sharing the same input width.
#[cfg_attr(all(feature = "py_binds", feature = "pyo3"), pyclass)]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ensemble {
    models: Vec<Classifier>,
}

#[derive(Deserialize)]
struct EnsembleFile {
    models: Vec<Classifier>,
}

impl Ensemble {
    pub fn new(models: Vec<Classifier>) -> Result<Ensemble> {
        let first = models.first().ok_or_else(|| {
            AprError::configuration(Stage::Scoring, "the model ensemble is empty")
        })?;
        let width = first.n_features();
        for (k, m) in models.iter().enumerate() {
            if m.n_features() != width {
                return Err(AprError::shape_mismatch(
                    Stage::Scoring,
                    width,
                    m.n_features(),
                    format!("features of model {}, model 0 sets the width", k),
                ))?;
            }
        }
        Ok(Ensemble { models })
    }

    pub fn models(&self) -> &[Classifier] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Feature width shared by all the models
    pub fn n_features(&self) -> usize {
        self.models[0].n_features()
    }

    /// Soft-voted probability for every row of the embedding
    pub fn score(&self, embedding: &Array2<f64>, batch_size: Option<usize>) -> Result<Array1<f64>> {
        score_batched(embedding, &self.models, batch_size)
    }

    /// Load an ensemble saved with `save_json`
    pub fn load_json(path: &Path) -> Result<Ensemble> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Error reading the ensemble file {}", path.display()))?;
        let file: EnsembleFile = serde_json::from_str(&content)
            .with_context(|| format!("Invalid ensemble file {}", path.display()))?;
        for (k, m) in file.models.iter().enumerate() {
            m.check().with_context(|| {
                format!("Invalid model {} in ensemble file {}", k, path.display())
            })?;
        }
        Ensemble::new(file.models)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)
            .with_context(|| format!("Error writing the ensemble file {}", path.display()))?;
        Ok(())
    }

    /// Load every `*.json` classifier of a directory. Files are read in
    /// lexicographic order, so that the model order is reproducible.
    pub fn load_dir(directory: &Path) -> Result<Ensemble> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(directory)
            .with_context(|| format!("Error listing the model directory {}", directory.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        let models = paths
            .iter()
            .map(|p| {
                debug!("Loading model {}", p.display());
                Classifier::load_json(p)
            })
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Loaded {} models from {}",
            models.len(),
            directory.display()
        );
        Ensemble::new(models)
    }

    /// A directory of classifiers or a single ensemble file
    pub fn load(path: &Path) -> Result<Ensemble> {
        if path.is_dir() {
            Self::load_dir(path)
        } else {
            Self::load_json(path)
        }
    }
}
