//! Error taxonomy of the profiling pipeline.
//!
//! Every public function returns an `anyhow::Result`; the errors raised by
//! the pipeline itself are `AprError` values, so callers can recover the
//! variant with `err.downcast_ref::<AprError>()`.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The pipeline stage an error originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Embedding,
    Scoring,
    Smoothing,
    RegionDetection,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Embedding => "embedding",
            Stage::Scoring => "ensemble scoring",
            Stage::Smoothing => "smoothing",
            Stage::RegionDetection => "region detection",
        };
        write!(f, "{}", name)
    }
}

#[derive(Clone, Debug, PartialEq, Error)]
pub enum AprError {
    /// Invalid parameters: empty ensemble, even window, null minimum length...
    #[error("[{stage}] configuration error: {message}")]
    Configuration { stage: Stage, message: String },

    /// Two arrays that should line up do not.
    #[error("[{stage}] shape mismatch: expected {expected} {message}, found {found}")]
    ShapeMismatch {
        stage: Stage,
        expected: usize,
        found: usize,
        message: String,
    },

    #[error("invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("invalid protein identifier `{0}`")]
    InvalidIdentifier(String),

    #[error("{what} not found for `{id}`")]
    NotFound { what: String, id: String },
}

impl AprError {
    pub fn configuration(stage: Stage, message: impl Into<String>) -> AprError {
        AprError::Configuration {
            stage,
            message: message.into(),
        }
    }

    /// `message` names what was counted, e.g. "rows in the embedding".
    pub fn shape_mismatch(
        stage: Stage,
        expected: usize,
        found: usize,
        message: impl Into<String>,
    ) -> AprError {
        AprError::ShapeMismatch {
            stage,
            expected,
            found,
            message: message.into(),
        }
    }

    pub fn not_found(what: &str, id: impl Into<String>) -> AprError {
        AprError::NotFound {
            what: what.to_string(),
            id: id.into(),
        }
    }

    /// Stage of a configuration or shape error, `None` for input errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AprError::Configuration { stage, .. } | AprError::ShapeMismatch { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }
}
