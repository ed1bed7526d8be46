//! Orchestration of a profiling run: embedding -> ensemble scores ->
//! smoothed profile -> regions, packaged as an `AggregationProfile`.
use crate::profile::ensemble::score_batched;
use crate::profile::model::Ensemble;
use crate::profile::regions::{detect_regions, AprRegion};
use crate::profile::smoothing::smooth;
use crate::shared::embedding::{check_embedding, EmbeddingProvider};
use crate::shared::parameters::ProfileParameters;
use crate::shared::parser::SequenceSource;
use crate::shared::sequence::{ProteinId, ProteinSequence};
#[cfg(feature = "kdam")]
use crate::shared::utils::IN_NOTEBOOK;
use anyhow::{Context, Result};
#[cfg(feature = "kdam")]
use kdam::TqdmParallelIterator;
use log::{debug, info};
use ndarray::{Array1, Array2};
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use pyo3::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "kdam")]
use std::sync::atomic::Ordering;

/// One line of the per-residue table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub uniprot_id: String,
    pub position: usize,
    pub residue: char,
    pub raw_score: f64,
    pub smoothed_score: f64,
}

/// One line of the region table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub uniprot_id: String,
    pub start: usize,
    pub end: usize,
    pub length: usize,
    pub mean_score: f64,
    pub segment: String,
}

#[cfg_attr(all(feature = "py_binds", feature = "pyo3"), pyclass)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregationProfile {
    pub uniprot_id: String,
    pub sequence: ProteinSequence,
    pub raw_scores: Array1<f64>,
    pub smoothed_scores: Array1<f64>,
    pub regions: Vec<AprRegion>,
    pub parameters: ProfileParameters,
}

impl AggregationProfile {
    /// Run the three stages on an embedding computed beforehand.
    pub fn compute(
        uniprot_id: &str,
        sequence: &ProteinSequence,
        embedding: &Array2<f64>,
        ensemble: &Ensemble,
        params: &ProfileParameters,
    ) -> Result<AggregationProfile> {
        params.validate()?;
        check_embedding(embedding, sequence)?;

        let raw_scores = score_batched(embedding, ensemble.models(), params.batch_size)?;
        let smoothed_scores = smooth(&raw_scores, params.window_size)?;
        let regions = detect_regions(
            &smoothed_scores,
            params.threshold,
            params.min_region_length,
        )?;
        debug!(
            "{}: {} residues, {} models, {} regions",
            uniprot_id,
            sequence.len(),
            ensemble.len(),
            regions.len()
        );

        Ok(AggregationProfile {
            uniprot_id: uniprot_id.to_string(),
            sequence: sequence.clone(),
            raw_scores,
            smoothed_scores,
            regions,
            parameters: params.clone(),
        })
    }

    /// Ask `provider` for the embedding, then `compute`.
    pub fn from_provider<E: EmbeddingProvider + ?Sized>(
        uniprot_id: &str,
        sequence: &ProteinSequence,
        provider: &E,
        ensemble: &Ensemble,
        params: &ProfileParameters,
    ) -> Result<AggregationProfile> {
        let embedding = provider
            .embed(uniprot_id, sequence)
            .with_context(|| format!("Embedding of {} failed", uniprot_id))?;
        Self::compute(uniprot_id, sequence, &embedding, ensemble, params)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Per-residue table, positions are 1-based
    pub fn rows(&self) -> Vec<ResultRow> {
        self.sequence
            .residues()
            .iter()
            .enumerate()
            .map(|(ii, &residue)| ResultRow {
                uniprot_id: self.uniprot_id.clone(),
                position: ii + 1,
                residue: residue as char,
                raw_score: self.raw_scores[ii],
                smoothed_score: self.smoothed_scores[ii],
            })
            .collect()
    }

    pub fn region_summaries(&self) -> Vec<RegionSummary> {
        self.regions
            .iter()
            .map(|r| RegionSummary {
                uniprot_id: self.uniprot_id.clone(),
                start: r.start,
                end: r.end,
                length: r.length(),
                mean_score: r.mean_score(&self.smoothed_scores),
                segment: self
                    .sequence
                    .segment(r.start, r.end)
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect()
    }

    /// Fraction of the residues that lie in a region
    pub fn apr_fraction(&self) -> f64 {
        let covered: usize = self.regions.iter().map(|r| r.length()).sum();
        covered as f64 / self.len() as f64
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Error writing the profile to {}", path.display()))?;
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<AggregationProfile> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Error reading the profile {}", path.display()))?;
        Ok(serde_json::from_str(&content)
            .with_context(|| format!("Invalid profile file {}", path.display()))?)
    }
}

/// Profile several proteins in parallel. Any failure aborts the whole batch;
/// results are in the order of `ids`.
pub fn profile_all<S, E>(
    ids: &[ProteinId],
    source: &S,
    provider: &E,
    ensemble: &Ensemble,
    params: &ProfileParameters,
) -> Result<Vec<AggregationProfile>>
where
    S: SequenceSource + Sync + ?Sized,
    E: EmbeddingProvider + Sync + ?Sized,
{
    params.validate()?;
    info!("Profiling {} proteins", ids.len());

    let run_one = |id: &ProteinId| -> Result<AggregationProfile> {
        let sequence = source
            .fetch(id)
            .with_context(|| format!("Retrieval of {} failed", id))?;
        AggregationProfile::from_provider(&id.to_string(), &sequence, provider, ensemble, params)
    };

    #[cfg(feature = "kdam")]
    {
        // In a notebook, we don't show the progress bar.
        if !IN_NOTEBOOK.load(Ordering::SeqCst) {
            return ids.par_iter().tqdm().map(run_one).collect();
        }
    }
    ids.par_iter().map(run_one).collect()
}
