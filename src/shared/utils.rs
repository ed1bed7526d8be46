use std::sync::atomic::AtomicBool;

/// Set from the python bindings, progress bars are hidden in notebooks.
pub static IN_NOTEBOOK: AtomicBool = AtomicBool::new(false);

pub fn sigmoid(x: f64) -> f64 {
    1. / (1. + (-x).exp())
}

/// Round to a fixed number of decimals (half away from zero)
/// ```
/// use aprofiler::shared::utils::round_decimals;
/// assert_eq!(round_decimals(0.66666, 4), 0.6667);
/// assert_eq!(round_decimals(-0.33333, 4), -0.3333);
/// ```
pub fn round_decimals(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_values() {
        assert_eq!(sigmoid(0.), 0.5);
        assert!((sigmoid(2.) + sigmoid(-2.) - 1.).abs() < 1e-12);
        assert!(sigmoid(-800.) >= 0.);
        assert!(sigmoid(800.) <= 1.);
    }
}
