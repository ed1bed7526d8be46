//! Detection of aggregation-prone regions (APR) on a smoothed profile
use crate::shared::errors::{AprError, Stage};
use anyhow::Result;
use ndarray::{s, Array1};
#[cfg(all(feature = "py_binds", feature = "pyo3"))]
use pyo3::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Contiguous run of residues, 1-based inclusive positions
#[cfg_attr(all(feature = "py_binds", feature = "pyo3"), pyclass(get_all))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AprRegion {
    pub start: usize,
    pub end: usize,
}

impl AprRegion {
    pub fn new(start: usize, end: usize) -> AprRegion {
        debug_assert!(start >= 1 && start <= end);
        AprRegion { start, end }
    }

    /// Number of residues in the region
    pub fn length(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains(&self, position: usize) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn positions(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Mean of `scores` (0-based array) over the region
    pub fn mean_score(&self, scores: &Array1<f64>) -> f64 {
        scores.slice(s![self.start - 1..self.end]).sum() / self.length() as f64
    }
}

impl fmt::Display for AprRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl From<AprRegion> for (usize, usize) {
    fn from(r: AprRegion) -> (usize, usize) {
        (r.start, r.end)
    }
}

/// Maximal runs of `scores[i] >= threshold` spanning at least `min_length`
/// residues, in increasing order.
///
/// The comparison is inclusive: a score equal to the threshold belongs to
/// the region. Shorter runs are discarded, never merged with a neighbour.
/// NaN never reaches the threshold.
/// ```
/// use aprofiler::detect_regions;
/// use ndarray::array;
/// let scores = array![0.1, 0.3, 0.3, 0.3, 0.3, 0.3, 0.1];
/// let regions = detect_regions(&scores, 0.3, 5).unwrap();
/// assert_eq!(regions.len(), 1);
/// assert_eq!((regions[0].start, regions[0].end), (2, 6));
/// ```
pub fn detect_regions(
    scores: &Array1<f64>,
    threshold: f64,
    min_length: usize,
) -> Result<Vec<AprRegion>> {
    if min_length == 0 {
        return Err(AprError::configuration(
            Stage::RegionDetection,
            "minimum region length must be positive",
        ))?;
    }
    if threshold.is_nan() {
        return Err(AprError::configuration(
            Stage::RegionDetection,
            "threshold is not a number",
        ))?;
    }

    let mut regions = Vec::new();
    // 0-based start of the run being read
    let mut open: Option<usize> = None;
    for (ii, &score) in scores.iter().enumerate() {
        match (open, score >= threshold) {
            (None, true) => open = Some(ii),
            (Some(start), false) => {
                close_run(&mut regions, start, ii - 1, min_length);
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        close_run(&mut regions, start, scores.len() - 1, min_length);
    }
    Ok(regions)
}

fn close_run(regions: &mut Vec<AprRegion>, start: usize, end: usize, min_length: usize) {
    if end - start + 1 >= min_length {
        regions.push(AprRegion::new(start + 1, end + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn pairs(regions: &[AprRegion]) -> Vec<(usize, usize)> {
        regions.iter().map(|&r| r.into()).collect()
    }

    #[test]
    fn exact_threshold_counts() {
        let scores = array![0.1, 0.3, 0.3, 0.3, 0.3, 0.3, 0.1];
        assert_eq!(pairs(&detect_regions(&scores, 0.3, 5).unwrap()), vec![(2, 6)]);
        assert!(detect_regions(&scores, 0.3, 6).unwrap().is_empty());
    }

    #[test]
    fn short_runs_do_not_merge() {
        let scores = array![0.3, 0.3, 0.3, 0.1, 0.3, 0.3, 0.3];
        assert!(detect_regions(&scores, 0.3, 4).unwrap().is_empty());
        assert_eq!(
            pairs(&detect_regions(&scores, 0.3, 3).unwrap()),
            vec![(1, 3), (5, 7)]
        );
    }

    #[test]
    fn run_open_at_the_end() {
        let scores = array![0.1, 0.1, 0.5, 0.5, 0.5, 0.5];
        assert_eq!(pairs(&detect_regions(&scores, 0.3, 3).unwrap()), vec![(3, 6)]);
    }

    #[test]
    fn degenerate_inputs() {
        assert!(detect_regions(&Array1::zeros(0), 0.5, 1).unwrap().is_empty());
        let scores = array![0.9, 0.9];
        assert!(detect_regions(&scores, 0.5, 3).unwrap().is_empty());
        assert_eq!(pairs(&detect_regions(&scores, 0.5, 1).unwrap()), vec![(1, 2)]);
        assert!(detect_regions(&array![f64::NAN, 0.9], 0.5, 2).unwrap().is_empty());
        assert!(detect_regions(&scores, 0.5, 0).is_err());
        assert!(detect_regions(&scores, f64::NAN, 1).is_err());
    }

    #[test]
    fn region_helpers() {
        let r = AprRegion::new(2, 4);
        assert_eq!(r.length(), 3);
        assert!(r.contains(2) && r.contains(4) && !r.contains(5));
        assert_eq!(r.to_string(), "2-4");
        assert_eq!(r.positions().count(), 3);
        let scores = array![0., 0.2, 0.4, 0.6, 1.];
        assert!((r.mean_score(&scores) - 0.4).abs() < 1e-12);
    }
}
