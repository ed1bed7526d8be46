//! Embedding providers: map a protein sequence to one feature vector per residue.
//!
//! Computing the embedding (a pretrained protein language model) happens
//! outside this crate; a provider only has to hand back an `(L, D)` matrix.
use crate::shared::errors::{AprError, Stage};
use crate::shared::parser::{read_matrix_csv, write_matrix_csv};
use crate::shared::sequence::ProteinSequence;
use anyhow::{Context, Result};
use log::debug;
use ndarray::Array2;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub trait EmbeddingProvider {
    /// `id` is only a cache key, the matrix must describe `sequence`.
    fn embed(&self, id: &str, sequence: &ProteinSequence) -> Result<Array2<f64>>;
}

/// Any function of the sequence is a provider.
impl<F> EmbeddingProvider for F
where
    F: Fn(&ProteinSequence) -> Result<Array2<f64>>,
{
    fn embed(&self, _id: &str, sequence: &ProteinSequence) -> Result<Array2<f64>> {
        self(sequence)
    }
}

/// Embeddings computed beforehand and stored as `<directory>/<id>.csv`,
/// one line per residue.
#[derive(Clone, Debug)]
pub struct PrecomputedEmbeddings {
    pub directory: PathBuf,
}

impl PrecomputedEmbeddings {
    pub fn new(directory: &Path) -> PrecomputedEmbeddings {
        PrecomputedEmbeddings {
            directory: directory.to_path_buf(),
        }
    }

    pub fn path(&self, id: &str) -> PathBuf {
        self.directory.join(format!("{}.csv", id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.path(id).is_file()
    }

    /// Store an embedding, creating the directory if needed.
    pub fn save(&self, id: &str, embedding: &Array2<f64>) -> Result<()> {
        fs::create_dir_all(&self.directory).with_context(|| {
            format!(
                "Error creating the embedding directory {}",
                self.directory.display()
            )
        })?;
        let path = self.path(id);
        let file = File::create(&path)
            .with_context(|| format!("Error creating {}", path.display()))?;
        write_matrix_csv(file, embedding)
    }
}

impl EmbeddingProvider for PrecomputedEmbeddings {
    fn embed(&self, id: &str, sequence: &ProteinSequence) -> Result<Array2<f64>> {
        let path = self.path(id);
        if !path.is_file() {
            return Err(AprError::not_found("embedding", id))?;
        }
        let file =
            File::open(&path).with_context(|| format!("Error opening {}", path.display()))?;
        let embedding = read_matrix_csv(BufReader::new(file))
            .with_context(|| format!("Invalid embedding file {}", path.display()))?;
        check_embedding(&embedding, sequence)?;
        debug!(
            "Loaded embedding of {} ({} x {})",
            id,
            embedding.nrows(),
            embedding.ncols()
        );
        Ok(embedding)
    }
}

/// One row per residue, at least one feature.
pub fn check_embedding(embedding: &Array2<f64>, sequence: &ProteinSequence) -> Result<()> {
    if embedding.nrows() != sequence.len() {
        return Err(AprError::shape_mismatch(
            Stage::Embedding,
            sequence.len(),
            embedding.nrows(),
            "embedding rows (one per residue)",
        ))?;
    }
    if embedding.ncols() == 0 {
        return Err(AprError::shape_mismatch(
            Stage::Embedding,
            1,
            0,
            "feature column at least",
        ))?;
    }
    Ok(())
}
