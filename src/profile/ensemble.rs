//! Soft-voting of the ensemble: every model scores every residue, the raw
//! profile is the per-residue mean of the model probabilities.
use crate::profile::model::ScoringModel;
use crate::shared::errors::{AprError, Stage};
use anyhow::{Context, Result};
use log::debug;
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;

/// Mean probability of the models for every row of `embedding`.
/// Fails if `models` is empty or if a model disagrees with the embedding shape.
pub fn score<M>(embedding: &Array2<f64>, models: &[M]) -> Result<Array1<f64>>
where
    M: ScoringModel + Sync,
{
    score_batched(embedding, models, None)
}

/// Same as `score`, the models see the rows by chunks of `batch_size`.
pub fn score_batched<M>(
    embedding: &Array2<f64>,
    models: &[M],
    batch_size: Option<usize>,
) -> Result<Array1<f64>>
where
    M: ScoringModel + Sync,
{
    let per_model = score_per_model(embedding, models, batch_size)?;
    // summed in the ensemble order, whatever the evaluation order was
    per_model.mean_axis(Axis(0)).ok_or_else(|| {
        AprError::configuration(Stage::Scoring, "the model ensemble is empty").into()
    })
}

/// Output of every model, one row per model (in ensemble order), one
/// column per residue.
pub fn score_per_model<M>(
    embedding: &Array2<f64>,
    models: &[M],
    batch_size: Option<usize>,
) -> Result<Array2<f64>>
where
    M: ScoringModel + Sync,
{
    if models.is_empty() {
        return Err(AprError::configuration(
            Stage::Scoring,
            "the model ensemble is empty",
        ))?;
    }
    if batch_size == Some(0) {
        return Err(AprError::configuration(
            Stage::Scoring,
            "batch size must be positive",
        ))?;
    }
    let (n_residues, n_features) = embedding.dim();
    if n_residues == 0 {
        return Err(AprError::shape_mismatch(
            Stage::Scoring,
            1,
            0,
            "embedding row at least",
        ))?;
    }
    for (k, model) in models.iter().enumerate() {
        if model.n_features() != n_features {
            return Err(AprError::shape_mismatch(
                Stage::Scoring,
                model.n_features(),
                n_features,
                format!("features per residue for model {}", k),
            ))?;
        }
    }

    let batch = batch_size.unwrap_or(n_residues);
    debug!(
        "Scoring {} residues with {} models (batch size {})",
        n_residues,
        models.len(),
        batch
    );

    // models are independent, the collected vector keeps their order
    let outputs = models
        .par_iter()
        .enumerate()
        .map(|(k, model)| predict_by_batch(embedding, model, batch, k))
        .collect::<Result<Vec<_>>>()?;

    let mut per_model = Array2::zeros((models.len(), n_residues));
    for (k, output) in outputs.iter().enumerate() {
        if output.len() != n_residues {
            return Err(AprError::shape_mismatch(
                Stage::Scoring,
                n_residues,
                output.len(),
                format!("probabilities from model {}", k),
            ))?;
        }
        per_model.row_mut(k).assign(output);
    }
    Ok(per_model)
}

fn predict_by_batch<M: ScoringModel>(
    embedding: &Array2<f64>,
    model: &M,
    batch: usize,
    index: usize,
) -> Result<Array1<f64>> {
    let mut probas = Vec::with_capacity(embedding.nrows());
    for chunk in embedding.axis_chunks_iter(Axis(0), batch) {
        let p = model
            .predict_proba(chunk)
            .with_context(|| format!("Evaluation of model {} failed", index))?;
        if p.len() != chunk.nrows() {
            return Err(AprError::shape_mismatch(
                Stage::Scoring,
                chunk.nrows(),
                p.len(),
                format!("probabilities from model {} on a batch", index),
            ))?;
        }
        probas.extend(p.iter().copied());
    }
    Ok(Array1::from(probas))
}
