use anyhow::Result;
use aprofiler::{Classifier, Ensemble, LogisticModel, MlpModel, ScoringModel};
use ndarray::{array, Array1, Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const N_FEATURES: usize = 4;

/// Returns the same probability for every residue.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct ConstantModel {
    pub width: usize,
    pub value: f64,
}

impl ScoringModel for ConstantModel {
    fn n_features(&self) -> usize {
        self.width
    }
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        Ok(Array1::from_elem(x.nrows(), self.value))
    }
}

/// Returns the first feature of each residue, unchanged.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct FirstFeatureModel {
    pub width: usize,
}

impl ScoringModel for FirstFeatureModel {
    fn n_features(&self) -> usize {
        self.width
    }
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        Ok(x.column(0).to_owned())
    }
}

/// Forgets the last residue of every batch.
#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct TruncatingModel {
    pub width: usize,
}

impl ScoringModel for TruncatingModel {
    fn n_features(&self) -> usize {
        self.width
    }
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        Ok(Array1::from_elem(x.nrows().saturating_sub(1), 0.5))
    }
}

#[allow(dead_code)]
pub fn simple_ensemble() -> Ensemble {
    let m1 = LogisticModel::new(array![1.5, -0.5, 0.25, 0.], -0.2).unwrap();
    let m2 = LogisticModel::new(array![0.5, 0.5, -1., 2.], 0.1).unwrap();
    let m3 = MlpModel::new(
        array![[1., -1., 0.5], [0.5, 1., -0.5], [0., 0.25, 1.], [-1., 0.5, 0.]],
        array![0.1, 0., -0.1],
        array![1., -0.5, 0.75],
        -0.3,
    )
    .unwrap();
    Ensemble::new(vec![
        Classifier::from(m1),
        Classifier::from(m2),
        Classifier::from(m3),
    ])
    .unwrap()
}

/// Ensemble whose raw score is exactly the first embedding feature:
/// a logistic model on feature 0 with logit(p) as input.
/// Used together with `logit_embedding`.
#[allow(dead_code)]
pub fn identity_ensemble() -> Ensemble {
    let m = LogisticModel::new(array![1., 0., 0., 0.], 0.).unwrap();
    Ensemble::new(vec![Classifier::from(m.clone()), Classifier::from(m)]).unwrap()
}

/// Embedding such that `identity_ensemble` scores residue i with `probas[i]`
#[allow(dead_code)]
pub fn logit_embedding(probas: &[f64]) -> Array2<f64> {
    let mut embedding = Array2::zeros((probas.len(), N_FEATURES));
    for (ii, &p) in probas.iter().enumerate() {
        embedding[[ii, 0]] = (p / (1. - p)).ln();
        embedding[[ii, 1]] = ii as f64;
    }
    embedding
}

#[allow(dead_code)]
pub fn random_embedding(n_residues: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((n_residues, N_FEATURES), |_| rng.gen_range(-2.0..2.0))
}

#[allow(dead_code)]
pub fn random_scores(n: usize, seed: u64) -> Array1<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array1::from_shape_fn(n, |_| rng.gen::<f64>())
}
