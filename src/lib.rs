#![warn(clippy::large_types_passed_by_value)]

pub mod profile;
pub mod shared;

pub use crate::profile::{
    detect_regions, profile_all, score, score_batched, score_per_model, smooth,
    AggregationProfile, AprRegion, Classifier, Ensemble, LogisticModel, MlpModel, ResultRow,
    ScoringModel,
};

pub use crate::shared::{
    AprError, EmbeddingProvider, FastaSequenceSource, PrecomputedEmbeddings, ProfileParameters,
    ProteinId, ProteinSequence, SequenceSource, Stage,
};

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use anyhow::Result;

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use kdam::set_notebook;

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1, PyReadonlyArray2};

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use pyo3::prelude::*;

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use rayon::ThreadPoolBuilder;

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use std::sync::atomic::Ordering;

/// Set the number of threads (if not run: all of them)
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
#[pyfunction]
fn set_number_threads(num_threads: usize) -> Result<()> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;
    Ok(())
}

/// Run to get notebook-compatible progress bars
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
#[pyfunction]
fn notebook_mode() {
    set_notebook(true);
    crate::shared::utils::IN_NOTEBOOK.store(true, Ordering::SeqCst);
}

/// Centered moving average with zero-padded edges
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
#[pyfunction]
#[pyo3(name = "smooth")]
fn py_smooth<'py>(
    py: Python<'py>,
    scores: PyReadonlyArray1<'py, f64>,
    window: usize,
) -> Result<Bound<'py, PyArray1<f64>>> {
    let smoothed = smooth(&scores.as_array().to_owned(), window)?;
    Ok(smoothed.into_pyarray_bound(py))
}

/// Aggregation-prone regions, as 1-based inclusive (start, end) pairs
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
#[pyfunction]
#[pyo3(name = "detect_regions")]
fn py_detect_regions(
    scores: PyReadonlyArray1<'_, f64>,
    threshold: f64,
    min_length: usize,
) -> Result<Vec<(usize, usize)>> {
    let regions = detect_regions(&scores.as_array().to_owned(), threshold, min_length)?;
    Ok(regions.into_iter().map(|r| r.into()).collect())
}

/// Full profile of one protein from its embedding
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
#[pyfunction]
#[pyo3(signature = (uniprot_id, sequence, embedding, ensemble, params=ProfileParameters::default()))]
fn compute_profile(
    uniprot_id: &str,
    sequence: &str,
    embedding: PyReadonlyArray2<'_, f64>,
    ensemble: &Ensemble,
    params: ProfileParameters,
) -> Result<AggregationProfile> {
    let sequence = ProteinSequence::from_string(sequence)?;
    AggregationProfile::compute(
        uniprot_id,
        &sequence,
        &embedding.as_array().to_owned(),
        ensemble,
        &params,
    )
}

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
#[pymodule]
#[pyo3(name = "_aprofiler")]
fn aprofiler_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<crate::profile::Ensemble>()?;
    m.add_class::<crate::profile::AggregationProfile>()?;
    m.add_class::<crate::profile::AprRegion>()?;
    m.add_class::<crate::shared::ProfileParameters>()?;
    m.add_function(wrap_pyfunction!(set_number_threads, m)?)?;
    m.add_function(wrap_pyfunction!(notebook_mode, m)?)?;
    m.add_function(wrap_pyfunction!(py_smooth, m)?)?;
    m.add_function(wrap_pyfunction!(py_detect_regions, m)?)?;
    m.add_function(wrap_pyfunction!(compute_profile, m)?)?;
    Ok(())
}
