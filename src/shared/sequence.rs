//! Protein sequences and the identifiers used to retrieve them
use crate::shared::errors::AprError;
use anyhow::Result;
use once_cell::sync::Lazy;
use phf::phf_set;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The 20 standard amino-acids, in alphabetical order of their one-letter code
pub const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

static VALID_RESIDUES: phf::Set<char> = phf_set! {
    'A', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W', 'Y',
};

// UniProt accession format (https://www.uniprot.org/help/accession_numbers),
// optionally followed by an isoform suffix.
static ACCESSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([OPQ][0-9][A-Z0-9]{3}[0-9]|[A-NR-Z][0-9](?:[A-Z][A-Z0-9]{2}[0-9]){1,2})(?:-([0-9]+))?$",
    )
    .unwrap()
});

pub fn is_valid_residue(residue: char) -> bool {
    VALID_RESIDUES.contains(&residue)
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProteinSequence {
    // always non-empty, upper-case, restricted to AMINO_ACIDS
    seq: Vec<u8>,
}

impl ProteinSequence {
    /// Clean up and validate a raw sequence string.
    /// Whitespace (including line breaks) is dropped and lower-case letters
    /// are accepted.
    /// ```
    /// use aprofiler::ProteinSequence;
    /// let seq = ProteinSequence::from_string("mkv\nLAA ").unwrap();
    /// assert_eq!(seq.to_string(), "MKVLAA");
    /// assert!(ProteinSequence::from_string("MKXA").is_err());
    /// ```
    pub fn from_string(s: &str) -> Result<ProteinSequence> {
        let mut seq = Vec::with_capacity(s.len());
        for c in s.chars().filter(|c| !c.is_whitespace()) {
            let upper = c.to_ascii_uppercase();
            if !is_valid_residue(upper) {
                return Err(AprError::InvalidSequence(format!(
                    "invalid residue '{}' at position {}",
                    c,
                    seq.len() + 1
                )))?;
            }
            seq.push(upper as u8);
        }
        if seq.is_empty() {
            return Err(AprError::InvalidSequence("empty sequence".to_string()))?;
        }
        Ok(ProteinSequence { seq })
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn residues(&self) -> &[u8] {
        &self.seq
    }

    /// Residue at a 1-based position
    pub fn residue(&self, position: usize) -> Option<char> {
        position
            .checked_sub(1)
            .and_then(|ii| self.seq.get(ii))
            .map(|&r| r as char)
    }

    /// Residues between two 1-based inclusive positions
    pub fn segment(&self, start: usize, end: usize) -> Option<&str> {
        if start == 0 || start > end || end > self.seq.len() {
            return None;
        }
        // validated ascii
        std::str::from_utf8(&self.seq[start - 1..end]).ok()
    }
}

impl fmt::Display for ProteinSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.seq))
    }
}

impl FromStr for ProteinSequence {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        ProteinSequence::from_string(s)
    }
}

impl TryFrom<String> for ProteinSequence {
    type Error = anyhow::Error;
    fn try_from(s: String) -> Result<Self> {
        ProteinSequence::from_string(&s)
    }
}

impl From<ProteinSequence> for String {
    fn from(seq: ProteinSequence) -> String {
        seq.to_string()
    }
}

/// UniProt accession with an optional isoform number (`P05067`, `P05067-4`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProteinId {
    pub accession: String,
    pub isoform: Option<u32>,
}

impl ProteinId {
    /// ```
    /// use aprofiler::ProteinId;
    /// let id = ProteinId::parse(" p05067-2 ").unwrap();
    /// assert_eq!(id.accession, "P05067");
    /// assert_eq!(id.isoform, Some(2));
    /// assert!(ProteinId::parse("not an id").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<ProteinId> {
        let cleaned = s.trim().to_ascii_uppercase();
        let caps = ACCESSION_REGEX
            .captures(&cleaned)
            .ok_or_else(|| AprError::InvalidIdentifier(s.trim().to_string()))?;
        let isoform = match caps.get(2) {
            Some(m) => Some(
                m.as_str()
                    .parse::<u32>()
                    .map_err(|_| AprError::InvalidIdentifier(s.trim().to_string()))?,
            ),
            None => None,
        };
        Ok(ProteinId {
            accession: caps[1].to_string(),
            isoform,
        })
    }

    /// The same protein without the isoform suffix
    pub fn canonical(&self) -> ProteinId {
        ProteinId {
            accession: self.accession.clone(),
            isoform: None,
        }
    }
}

impl fmt::Display for ProteinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.isoform {
            Some(iso) => write!(f, "{}-{}", self.accession, iso),
            None => write!(f, "{}", self.accession),
        }
    }
}

impl FromStr for ProteinId {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        ProteinId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_validation() {
        let seq = ProteinSequence::from_string("ACDEFGHIKLMNPQRSTVWY").unwrap();
        assert_eq!(seq.len(), 20);
        assert_eq!(seq.residue(1), Some('A'));
        assert_eq!(seq.residue(20), Some('Y'));
        assert_eq!(seq.residue(0), None);
        assert_eq!(seq.residue(21), None);
        assert_eq!(seq.segment(2, 4), Some("CDE"));
        assert_eq!(seq.segment(4, 2), None);

        let err = ProteinSequence::from_string("MKB").unwrap_err();
        assert_eq!(
            err.downcast_ref::<AprError>(),
            Some(&AprError::InvalidSequence(
                "invalid residue 'B' at position 3".to_string()
            ))
        );
        assert!(ProteinSequence::from_string("  \n").is_err());
        assert!(ProteinSequence::from_string("").is_err());
    }

    #[test]
    fn sequence_serde() {
        let seq = ProteinSequence::from_string("MKV").unwrap();
        let json = serde_json::to_string(&seq).unwrap();
        assert_eq!(json, "\"MKV\"");
        let back: ProteinSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, seq);
        assert!(serde_json::from_str::<ProteinSequence>("\"MK1\"").is_err());
    }

    #[test]
    fn identifiers() {
        let id: ProteinId = "Q9Y6K9".parse().unwrap();
        assert_eq!(id.isoform, None);
        assert_eq!(id.to_string(), "Q9Y6K9");
        let id = ProteinId::parse("A0A024RBG1-3").unwrap();
        assert_eq!(id.accession, "A0A024RBG1");
        assert_eq!(id.isoform, Some(3));
        assert_eq!(id.canonical().to_string(), "A0A024RBG1");
        assert!(ProteinId::parse("P05067-").is_err());
        assert!(ProteinId::parse("").is_err());
    }
}
