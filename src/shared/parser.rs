// Readers for the local inputs: FASTA sequence collections and embedding
// matrices stored as headerless csv files.

use crate::shared::errors::AprError;
use crate::shared::sequence::{ProteinId, ProteinSequence};
use anyhow::{anyhow, Context, Result};
use bio::io::fasta;
use csv::{ReaderBuilder, WriterBuilder};
use log::{debug, warn};
use ndarray::Array2;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Anything able to map an identifier to a protein sequence.
pub trait SequenceSource {
    fn fetch(&self, id: &ProteinId) -> Result<ProteinSequence>;
}

/// In-memory collection of sequences read from a FASTA file.
#[derive(Default, Clone, Debug)]
pub struct FastaSequenceSource {
    // key: record identifier (accession for UniProt headers)
    records: HashMap<String, String>,
    order: Vec<String>,
}

/// Extract the lookup key of a FASTA record id.
/// UniProt headers (`sp|P05067|A4_HUMAN`) are keyed by their accession,
/// anything else by the full id.
pub fn record_key(record_id: &str) -> &str {
    let fields: Vec<&str> = record_id.split('|').collect();
    match fields.as_slice() {
        ["sp" | "tr", accession, ..] if !accession.is_empty() => *accession,
        _ => record_id,
    }
}

impl FastaSequenceSource {
    pub fn from_path(path: &Path) -> Result<FastaSequenceSource> {
        let file = File::open(path)
            .with_context(|| format!("Error opening the fasta file {}", path.display()))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<FastaSequenceSource> {
        let mut source = FastaSequenceSource::default();
        for record in fasta::Reader::new(reader).records() {
            let record = record.map_err(|e| anyhow!("Invalid fasta record: {}", e))?;
            let key = record_key(record.id()).to_string();
            let seq = String::from_utf8(record.seq().to_vec())
                .map_err(|_| anyhow!("Non utf-8 sequence for record {}", key))?;
            if source.records.insert(key.clone(), seq).is_some() {
                warn!("Duplicated fasta record {}, keeping the last one", key);
            } else {
                source.order.push(key);
            }
        }
        debug!("Loaded {} fasta records", source.order.len());
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Record keys, in file order
    pub fn keys(&self) -> &[String] {
        &self.order
    }
}

impl SequenceSource for FastaSequenceSource {
    /// An isoform is looked up with its suffix; isoform 1 falls back to the
    /// canonical entry, which UniProt stores without suffix.
    fn fetch(&self, id: &ProteinId) -> Result<ProteinSequence> {
        let raw = match self.records.get(&id.to_string()) {
            Some(seq) => seq,
            None if id.isoform == Some(1) => self
                .records
                .get(&id.accession)
                .ok_or_else(|| AprError::not_found("sequence", id.to_string()))?,
            None => Err(AprError::not_found("sequence", id.to_string()))?,
        };
        ProteinSequence::from_string(raw).with_context(|| format!("Invalid sequence for {}", id))
    }
}

/// Read a dense matrix from a csv file without header, one row per line.
pub fn read_matrix_csv<R: Read>(reader: R) -> Result<Array2<f64>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut data = Vec::new();
    let mut nrows = 0;
    let mut ncols = None;
    for (ii, record) in rdr.records().enumerate() {
        let record = record?;
        match ncols {
            None => ncols = Some(record.len()),
            Some(n) if n != record.len() => {
                return Err(anyhow!(
                    "Ragged matrix: line {} has {} columns, expected {}",
                    ii + 1,
                    record.len(),
                    n
                ));
            }
            _ => {}
        }
        for field in record.iter() {
            data.push(
                field
                    .parse::<f64>()
                    .map_err(|_| anyhow!("Invalid number `{}` on line {}", field, ii + 1))?,
            );
        }
        nrows += 1;
    }
    Ok(Array2::from_shape_vec((nrows, ncols.unwrap_or(0)), data)?)
}

pub fn write_matrix_csv<W: Write>(writer: W, matrix: &Array2<f64>) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    for row in matrix.rows() {
        wtr.write_record(row.iter().map(|x| x.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    const FASTA: &str = ">sp|P05067|A4_HUMAN Amyloid-beta precursor protein
MLPGLALLLL
AAWTARA
>sp|P05067-2|A4_HUMAN Isoform APP305
MLPGLA
>custom_protein
MKV
";

    #[test]
    fn fasta_lookup() {
        let source = FastaSequenceSource::from_reader(FASTA.as_bytes()).unwrap();
        assert_eq!(source.len(), 3);
        assert_eq!(source.keys(), &["P05067", "P05067-2", "custom_protein"]);

        let seq = source.fetch(&ProteinId::parse("P05067").unwrap()).unwrap();
        assert_eq!(seq.to_string(), "MLPGLALLLLAAWTARA");
        let iso = source.fetch(&ProteinId::parse("P05067-2").unwrap()).unwrap();
        assert_eq!(iso.to_string(), "MLPGLA");
        let canonical = source.fetch(&ProteinId::parse("P05067-1").unwrap()).unwrap();
        assert_eq!(canonical, seq);

        let err = source
            .fetch(&ProteinId::parse("P05067-3").unwrap())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AprError>(),
            Some(AprError::NotFound { .. })
        ));
    }

    #[test]
    fn record_keys() {
        assert_eq!(record_key("sp|Q9Y6K9|NEMO_HUMAN"), "Q9Y6K9");
        assert_eq!(record_key("tr|A0A024RBG1|X"), "A0A024RBG1");
        assert_eq!(record_key("P05067"), "P05067");
        assert_eq!(record_key("gi|12345|ref"), "gi|12345|ref");
    }

    #[test]
    fn matrix_csv() {
        let m = array![[0.5, -1.25, 3.], [1e-3, 0., 2.]];
        let mut buffer = Vec::new();
        write_matrix_csv(&mut buffer, &m).unwrap();
        let back = read_matrix_csv(buffer.as_slice()).unwrap();
        assert_eq!(back, m);

        assert!(read_matrix_csv("1,2\n3\n".as_bytes()).is_err());
        assert!(read_matrix_csv("1,a\n".as_bytes()).is_err());
    }
}
