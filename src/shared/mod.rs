//! Inputs, configuration and errors shared by the profiling pipeline
pub mod embedding;
pub mod errors;
pub mod parameters;
pub mod parser;
pub mod py_binding;
pub mod sequence;
pub mod utils;

pub use embedding::{EmbeddingProvider, PrecomputedEmbeddings};
pub use errors::{AprError, Stage};
pub use parameters::ProfileParameters;
pub use parser::{FastaSequenceSource, SequenceSource};
pub use sequence::{ProteinId, ProteinSequence, AMINO_ACIDS};
