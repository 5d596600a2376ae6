//! Helper functions for integration tests

use denit_rs::models::{build_model, DoseSchedule, NetworkKind};
use denit_rs::physics::{RateParameters, Trajectory};
use denit_rs::solver::{Scenario, TimeGrid};
use nalgebra::DVector;

/// Reference grid: 321 points on [0, 320] min
pub fn reference_grid() -> TimeGrid {
    TimeGrid::linspace(0.0, 320.0, 321).unwrap()
}

/// Simple chain with rates `[k1, k2]` from X0 = [1200, 0, 0]
pub fn chain_scenario(k1: f64, k2: f64, grid: TimeGrid) -> Scenario {
    let model = build_model(
        NetworkKind::SimpleChain,
        RateParameters::new(vec![k1, k2]).unwrap(),
        DoseSchedule::empty(),
    )
    .unwrap();

    Scenario::new(model, DVector::from_vec(vec![1200.0, 0.0, 0.0]), grid).unwrap()
}

/// Assert that two trajectories agree row by row (within tolerance)
pub fn assert_rows_close(a: &Trajectory, b: &Trajectory, tolerance: f64, message: &str) {
    assert_eq!(a.shape(), b.shape(), "{}: shape mismatch", message);

    for i in 0..a.rows() {
        for (j, (&v1, &v2)) in a.row(i).iter().zip(b.row(i).iter()).enumerate() {
            let diff = (v1 - v2).abs();
            assert!(
                diff < tolerance,
                "{}: row {} column {} differs by {} (tolerance {})",
                message, i, j, diff, tolerance
            );
        }
    }
}

/// RMS difference between two trajectories
pub fn compute_l2_error(a: &Trajectory, b: &Trajectory) -> f64 {
    let diffs: Vec<f64> = a
        .as_array()
        .iter()
        .zip(b.as_array().iter())
        .map(|(v1, v2)| (v1 - v2).powi(2))
        .collect();

    if diffs.is_empty() {
        0.0
    } else {
        (diffs.iter().sum::<f64>() / diffs.len() as f64).sqrt()
    }
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}
