#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use crate::profile::{AggregationProfile, Ensemble};
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use anyhow::Result;
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray2};
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use pyo3::prelude::*;
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use std::path::Path;

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
#[pymethods]
impl Ensemble {
    #[staticmethod]
    #[pyo3(name = "load")]
    /// Load an ensemble from a json file or a directory of json classifiers
    fn py_load(path: &str) -> Result<Ensemble> {
        Ensemble::load(Path::new(path))
    }

    #[pyo3(name = "save_json")]
    fn py_save_json(&self, path: &str) -> Result<()> {
        self.save_json(Path::new(path))
    }

    #[pyo3(name = "score", signature = (embedding, batch_size=None))]
    fn py_score<'py>(
        &self,
        py: Python<'py>,
        embedding: PyReadonlyArray2<'py, f64>,
        batch_size: Option<usize>,
    ) -> Result<Bound<'py, PyArray1<f64>>> {
        let scores = self.score(&embedding.as_array().to_owned(), batch_size)?;
        Ok(scores.into_pyarray_bound(py))
    }

    fn __len__(&self) -> usize {
        self.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Ensemble({} models, {} features)",
            self.len(),
            self.n_features()
        )
    }
}

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
#[pymethods]
impl AggregationProfile {
    #[getter]
    fn get_uniprot_id(&self) -> String {
        self.uniprot_id.clone()
    }

    #[getter]
    fn get_sequence(&self) -> String {
        self.sequence.to_string()
    }

    #[getter]
    fn get_raw_scores(&self, py: Python) -> Py<PyArray1<f64>> {
        self.raw_scores.to_owned().into_pyarray_bound(py).into()
    }

    #[getter]
    fn get_smoothed_scores(&self, py: Python) -> Py<PyArray1<f64>> {
        self.smoothed_scores.to_owned().into_pyarray_bound(py).into()
    }

    #[getter]
    fn get_regions(&self) -> Vec<(usize, usize)> {
        self.regions.iter().map(|&r| r.into()).collect()
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn __repr__(&self) -> String {
        format!(
            "AggregationProfile({}, {} residues, {} regions)",
            self.uniprot_id,
            self.len(),
            self.regions.len()
        )
    }
}
