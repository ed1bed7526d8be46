//! Moving average of the raw profile.
use crate::shared::errors::{AprError, Stage};
use anyhow::Result;
use ndarray::{s, Array1};

/// Centered moving average of odd width `window`.
///
/// Positions closer than `window / 2` to an end see a window that extends
/// past the array; the missing values count as zeros and the sum is still
/// divided by `window`, so the profile dips at both ends.
/// ```
/// use aprofiler::smooth;
/// use ndarray::array;
/// let smoothed = smooth(&array![0.9, 0.9, 0.9], 3).unwrap();
/// assert!((smoothed[0] - 0.6).abs() < 1e-12);
/// assert!((smoothed[1] - 0.9).abs() < 1e-12);
/// assert!(smooth(&array![0.9, 0.9, 0.9], 2).is_err());
/// ```
pub fn smooth(scores: &Array1<f64>, window: usize) -> Result<Array1<f64>> {
    if window == 0 || window % 2 == 0 {
        return Err(AprError::configuration(
            Stage::Smoothing,
            format!(
                "window width must be a positive odd integer, got {}",
                window
            ),
        ))?;
    }
    if window == 1 {
        return Ok(scores.clone());
    }

    let n = scores.len();
    let half = window / 2;
    let width = window as f64;
    Ok(Array1::from_shape_fn(n, |ii| {
        let lo = ii.saturating_sub(half);
        let hi = (ii + half + 1).min(n);
        scores.slice(s![lo..hi]).sum() / width
    }))
}
