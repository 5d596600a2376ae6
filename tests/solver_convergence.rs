//! Convergence tests for numerical solvers
//!
//! These tests verify that solvers exhibit the expected convergence rates
//! when refining the step (RK4) or tightening the tolerances (Dopri5).

use denit_rs::solver::{Dopri5Solver, RK4Solver, Scenario, Solver, SolverConfiguration, TimeGrid};
use nalgebra::DVector;

mod common;
use common::{compute_l2_error, ExponentialDecay};

fn decay_scenario(rate: f64, grid: TimeGrid) -> Scenario {
    Scenario::new(
        Box::new(ExponentialDecay::new(rate)),
        DVector::from_element(1, 1.0),
        grid,
    )
    .unwrap()
}

#[test]
fn test_rk4_fourth_order_convergence() {
    // RK4 should have fourth-order convergence: error ~ O(dt^4)
    // When dt → dt/2, error should → error/16

    let decay_rate: f64 = 0.3;
    let total_time = 5.0;
    let exact = (-decay_rate * total_time).exp();

    let substeps_list = vec![10, 20, 40, 80];
    let mut errors = Vec::new();

    let rk4 = RK4Solver::new();

    for &substeps in &substeps_list {
        // Single interval: all steps are substeps
        let grid = TimeGrid::new(vec![0.0, total_time]).unwrap();
        let scenario = decay_scenario(decay_rate, grid);

        let config = SolverConfiguration::fixed_step(substeps);
        let result = rk4.solve(&scenario, &config).unwrap();

        let final_conc = result.final_state().unwrap()[0];
        errors.push((final_conc - exact).abs());
    }

    // Check convergence ratios
    for i in 0..errors.len() - 1 {
        let ratio = errors[i] / errors[i + 1];
        println!("RK4 convergence ratio {}->{}: {}", i, i + 1, ratio);

        // Should be close to 16 for fourth-order
        assert!(
            ratio > 12.0 && ratio < 20.0,
            "Convergence ratio {} not fourth-order",
            ratio
        );
    }
}

#[test]
fn test_rk4_convergence_independent_of_output_grid() {
    // Same total step count, split across a different number of output rows
    let decay_rate = 0.3;
    let exact = (-decay_rate * 5.0f64).exp();

    let coarse = decay_scenario(decay_rate, TimeGrid::new(vec![0.0, 5.0]).unwrap());
    let fine = decay_scenario(decay_rate, TimeGrid::linspace(0.0, 5.0, 11).unwrap());

    let rk4 = RK4Solver::new();
    let a = rk4.solve(&coarse, &SolverConfiguration::fixed_step(40)).unwrap();
    let b = rk4.solve(&fine, &SolverConfiguration::fixed_step(4)).unwrap();

    let error_a = (a.final_state().unwrap()[0] - exact).abs();
    let error_b = (b.final_state().unwrap()[0] - exact).abs();

    assert!((error_a - error_b).abs() < 1e-12);
}

#[test]
fn test_dopri5_error_follows_tolerance() {
    let decay_rate = 0.3;
    let grid = TimeGrid::linspace(0.0, 10.0, 21).unwrap();
    let model = ExponentialDecay::new(decay_rate);

    let dopri5 = Dopri5Solver::new();
    let mut errors = Vec::new();
    let mut evaluations = Vec::new();

    for &rtol in &[1e-4, 1e-7, 1e-10] {
        let scenario = decay_scenario(decay_rate, grid.clone());
        let result = dopri5
            .solve(&scenario, &SolverConfiguration::adaptive(rtol, rtol * 1e-3))
            .unwrap();
        assert!(result.success());

        let max_error = result
            .time_points
            .iter()
            .enumerate()
            .map(|(i, &t)| (result.trajectory.row(i)[0] - model.analytical_solution(t, 1.0)).abs())
            .fold(0.0, f64::max);

        println!("Dopri5 rtol {:e}: max error {:e}", rtol, max_error);

        // Global error stays within a modest multiple of the tolerance
        assert!(max_error < 100.0 * rtol, "rtol {}: error {} too large", rtol, max_error);

        errors.push(max_error);
        evaluations.push(result.diagnostic.evaluations);
    }

    for i in 0..errors.len() - 1 {
        assert!(errors[i + 1] < errors[i]);
        assert!(evaluations[i + 1] > evaluations[i]);
    }
}

#[test]
fn test_dopri5_and_refined_rk4_converge_to_same_trajectory() {
    let grid = TimeGrid::linspace(0.0, 10.0, 11).unwrap();

    let adaptive = Dopri5Solver::new()
        .solve(
            &decay_scenario(0.5, grid.clone()),
            &SolverConfiguration::adaptive(1e-10, 1e-12),
        )
        .unwrap();
    let fixed = RK4Solver::new()
        .solve(&decay_scenario(0.5, grid), &SolverConfiguration::fixed_step(200))
        .unwrap();

    let l2 = compute_l2_error(&adaptive.trajectory, &fixed.trajectory);
    assert!(l2 < 1e-8, "L2 difference {} too large", l2);
}
