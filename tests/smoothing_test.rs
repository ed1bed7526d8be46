use anyhow::Result;
use approx::assert_abs_diff_eq;
use aprofiler::smooth;
use ndarray::{array, Array1};
mod common;

#[test]
fn window_one_is_identity() -> Result<()> {
    for seed in 0..5 {
        let x = common::random_scores(31, seed);
        assert_eq!(smooth(&x, 1)?, x);
    }
    Ok(())
}

#[test]
fn same_length_as_input() -> Result<()> {
    for n in [1, 2, 5, 40] {
        for w in [1, 3, 5, 9, 41] {
            assert_eq!(smooth(&common::random_scores(n, 7), w)?.len(), n);
        }
    }
    Ok(())
}

#[test]
fn linearity() -> Result<()> {
    let x = common::random_scores(50, 10);
    let y = common::random_scores(50, 11);
    let (a, b) = (0.7, -2.3);
    for w in [3, 5, 11] {
        let combined = smooth(&(&x * a + &y * b), w)?;
        let separate = smooth(&x, w)? * a + smooth(&y, w)? * b;
        assert_abs_diff_eq!(combined, separate, epsilon = 1e-10);
    }
    Ok(())
}

#[test]
fn edge_bias_is_kept() -> Result<()> {
    // constant profile: the interior keeps its value, the first and last
    // half-windows are pulled toward zero
    let x = Array1::from_elem(10, 0.6);
    let y = smooth(&x, 5)?;
    assert_abs_diff_eq!(
        y,
        array![0.36, 0.48, 0.6, 0.6, 0.6, 0.6, 0.6, 0.6, 0.48, 0.36],
        epsilon = 1e-12
    );
    Ok(())
}

#[test]
fn interior_is_a_centered_mean() -> Result<()> {
    let x = array![0., 1., 2., 3., 4., 5., 6.];
    let y = smooth(&x, 3)?;
    assert_abs_diff_eq!(
        y,
        array![1. / 3., 1., 2., 3., 4., 5., 11. / 3.],
        epsilon = 1e-12
    );
    Ok(())
}
