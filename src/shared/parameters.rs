//! The structs used for specifying the parameters of a profiling run
use crate::shared::errors::{AprError, Stage};
use anyhow::{Context, Result};
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[cfg_attr(all(feature = "py_binds", feature = "pyo3"), pyclass(get_all, set_all))]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileParameters {
    // Width of the centered moving average, must be odd
    pub window_size: usize,
    // Smoothed scores >= threshold are considered aggregation prone
    pub threshold: f64,
    // Runs shorter than this are not reported
    pub min_region_length: usize,
    // Number of residues given to a model at once (None: the whole sequence).
    // Only affects memory usage, never the scores.
    pub batch_size: Option<usize>,
}

impl Default for ProfileParameters {
    fn default() -> ProfileParameters {
        ProfileParameters {
            window_size: 7,
            threshold: 0.5,
            min_region_length: 5,
            batch_size: None,
        }
    }
}

#[cfg(all(feature = "py_binds", feature = "pyo3"))]
#[pymethods]
impl ProfileParameters {
    #[new]
    #[pyo3(signature = (window_size=7, threshold=0.5, min_region_length=5, batch_size=None))]
    pub fn py_new(
        window_size: usize,
        threshold: f64,
        min_region_length: usize,
        batch_size: Option<usize>,
    ) -> Self {
        ProfileParameters {
            window_size,
            threshold,
            min_region_length,
            batch_size,
        }
    }

    fn __repr__(&self) -> PyResult<String> {
        Ok(format!(
            "ProfileParameters(window_size={}, threshold={}, min_region_length={}, batch_size={:?})",
            self.window_size, self.threshold, self.min_region_length, self.batch_size
        ))
    }

    fn __str__(&self) -> PyResult<String> {
        self.__repr__()
    }
}

impl ProfileParameters {
    pub fn new(window_size: usize, threshold: f64, min_region_length: usize) -> Self {
        Self {
            window_size,
            threshold,
            min_region_length,
            ..Default::default()
        }
    }

    /// Check the parameters before anything is computed.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 || self.window_size % 2 == 0 {
            return Err(AprError::configuration(
                Stage::Smoothing,
                format!(
                    "window width must be a positive odd integer, got {}",
                    self.window_size
                ),
            ))?;
        }
        if self.min_region_length == 0 {
            return Err(AprError::configuration(
                Stage::RegionDetection,
                "minimum region length must be positive",
            ))?;
        }
        if self.threshold.is_nan() {
            return Err(AprError::configuration(
                Stage::RegionDetection,
                "threshold is not a number",
            ))?;
        }
        if self.batch_size == Some(0) {
            return Err(AprError::configuration(
                Stage::Scoring,
                "batch size must be positive",
            ))?;
        }
        Ok(())
    }

    /// Load (and validate) parameters from a json file. Missing fields take
    /// their default value.
    pub fn load_json(path: &Path) -> Result<ProfileParameters> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Error reading parameters from {}", path.display()))?;
        let params: ProfileParameters = serde_json::from_str(&content)
            .with_context(|| format!("Invalid parameter file {}", path.display()))?;
        params.validate()?;
        Ok(params)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Error writing parameters to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_stage(params: &ProfileParameters) -> Option<Stage> {
        match params.validate().unwrap_err().downcast_ref::<AprError>() {
            Some(AprError::Configuration { stage, .. }) => Some(*stage),
            _ => None,
        }
    }

    #[test]
    fn default_is_valid() {
        assert!(ProfileParameters::default().validate().is_ok());
        assert!(ProfileParameters::new(1, 0.3, 1).validate().is_ok());
    }

    #[test]
    fn invalid_parameters() {
        assert_eq!(
            config_stage(&ProfileParameters::new(4, 0.5, 5)),
            Some(Stage::Smoothing)
        );
        assert_eq!(
            config_stage(&ProfileParameters::new(0, 0.5, 5)),
            Some(Stage::Smoothing)
        );
        assert_eq!(
            config_stage(&ProfileParameters::new(5, 0.5, 0)),
            Some(Stage::RegionDetection)
        );
        assert_eq!(
            config_stage(&ProfileParameters::new(5, f64::NAN, 3)),
            Some(Stage::RegionDetection)
        );
        let params = ProfileParameters {
            batch_size: Some(0),
            ..Default::default()
        };
        assert_eq!(config_stage(&params), Some(Stage::Scoring));
    }

    #[test]
    fn partial_json() {
        let params: ProfileParameters =
            serde_json::from_str(r#"{"window_size": 5, "threshold": 0.4}"#).unwrap();
        assert_eq!(params.window_size, 5);
        assert_eq!(params.threshold, 0.4);
        assert_eq!(params.min_region_length, 5);
        assert_eq!(params.batch_size, None);
    }
}
