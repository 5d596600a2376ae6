//! End-to-end denitrification scenarios
//!
//! Reference runs of both networks, checked against closed-form results.

use approx::assert_relative_eq;
use denit_rs::config::SimulationConfig;
use denit_rs::models::{build_model, DoseSchedule, ForcedBranching, NetworkKind, SimpleChain};
use denit_rs::physics::{RateParameters, ReactionModel};
use denit_rs::solver::{
    integrate, integrate_with, Dopri5Solver, Scenario, Solver, SolverConfiguration, SolverStatus, TimeGrid,
};
use nalgebra::DVector;

mod common;
use common::{chain_scenario, reference_grid, FailsAfter};

// =================================================================================================
// Simple chain
// =================================================================================================

#[test]
fn test_reference_run_end_to_end() {
    let scenario = chain_scenario(45.0, 10.0, reference_grid());
    let result = Dopri5Solver::new()
        .solve(&scenario, &SolverConfiguration::default())
        .unwrap();

    assert!(result.success());
    assert_eq!(result.trajectory.shape(), (321, 3));
    assert_eq!(result.labels, vec!["NO2", "NO", "N2O"]);

    // k1 > k2 keeps feeding NO
    let no = result.series("NO").unwrap();
    assert!(no[320] > 0.0);

    // d[N2O]/dt = k2 >= 0
    let n2o = result.series("N2O").unwrap();
    for i in 1..n2o.len() {
        assert!(n2o[i] >= n2o[i - 1], "N2O decreased at row {}", i);
    }
}

#[test]
fn test_first_row_is_exact_initial_state() {
    let scenario = chain_scenario(45.0, 10.0, reference_grid());
    let result = Dopri5Solver::new()
        .solve(&scenario, &SolverConfiguration::default())
        .unwrap();

    let row0 = result.trajectory.row(0);
    assert_eq!(row0.to_vec(), vec![1200.0, 0.0, 0.0]);
}

#[test]
fn test_chain_matches_closed_form() {
    let model = SimpleChain::new(RateParameters::new(vec![45.0, 10.0]).unwrap()).unwrap();
    let x0 = DVector::from_vec(vec![1200.0, 0.0, 0.0]);
    let grid = reference_grid();

    let (trajectory, diagnostic) = integrate(&model, &x0, &grid).unwrap();
    assert!(diagnostic.success());

    for (i, &t) in grid.iter().enumerate() {
        let exact = model.analytical_solution(&x0, 0.0, t);
        for j in 0..3 {
            assert_relative_eq!(trajectory.row(i)[j], exact[j], epsilon = 1e-6, max_relative = 1e-9);
        }
    }
}

#[test]
fn test_mass_balance_through_crossover() {
    // NO2 is drained at a constant k1 and never clamped: at t = 100 it sits
    // at 1200 - 4500, past the crossover at 1200 / 45 ≈ 26.7 min
    let grid = TimeGrid::linspace(0.0, 100.0, 101).unwrap();
    let scenario = chain_scenario(45.0, 10.0, grid);
    let result = Dopri5Solver::new()
        .solve(&scenario, &SolverConfiguration::default())
        .unwrap();

    let last = result.final_state().unwrap();
    assert_relative_eq!(last[0], 1200.0 - 45.0 * 100.0, epsilon = 1e-6);
    assert_relative_eq!(last[1], 35.0 * 100.0, epsilon = 1e-6);
    assert_relative_eq!(last[2], 10.0 * 100.0, epsilon = 1e-6);

    // Species total conserved on every row
    for total in result.trajectory.totals() {
        assert_relative_eq!(total, 1200.0, epsilon = 1e-6);
    }
}

#[test]
fn test_integrate_is_deterministic() {
    let model = SimpleChain::new(RateParameters::new(vec![45.0, 10.0]).unwrap()).unwrap();
    let x0 = DVector::from_vec(vec![1200.0, 0.0, 0.0]);
    let grid = reference_grid();

    let (a, da) = integrate(&model, &x0, &grid).unwrap();
    let (b, db) = integrate(&model, &x0, &grid).unwrap();

    assert_eq!(da, db);
    for (x, y) in a.as_array().iter().zip(b.as_array().iter()) {
        assert_eq!(x.to_bits(), y.to_bits());
    }
}

#[test]
fn test_single_point_grid() {
    let model = SimpleChain::new(RateParameters::new(vec![45.0, 10.0]).unwrap()).unwrap();
    let x0 = DVector::from_vec(vec![1200.0, 0.0, 0.0]);
    let grid = TimeGrid::linspace(0.0, 320.0, 1).unwrap();

    let (trajectory, diagnostic) = integrate(&model, &x0, &grid).unwrap();

    assert!(diagnostic.success());
    assert_eq!(diagnostic.evaluations, 0);
    assert_eq!(trajectory.rows(), 1);
    assert_eq!(trajectory.state(0).unwrap(), x0);
}

// =================================================================================================
// Forced branching
// =================================================================================================

fn branching_model() -> ForcedBranching {
    ForcedBranching::new(
        RateParameters::new(vec![45.0, 10.0, 5.0, 0.0]).unwrap(),
        DoseSchedule::from_pairs(&[(-0.001, 1200.0)]).unwrap(),
    )
    .unwrap()
}

#[test]
fn test_branching_initial_derivative() {
    let model = branching_model();
    let forcing_0 = model.forcing().evaluate(0.0);
    assert!(forcing_0 > 0.0);

    let dx = model.derivative(&DVector::zeros(3), 0.0).unwrap();
    assert_eq!(dx[0], 45.0 * forcing_0);
}

#[test]
fn test_branching_total_no_matches_integrated_flux() {
    let model = branching_model();
    let x0 = DVector::zeros(3);
    let grid = TimeGrid::linspace(0.0, 320.0, 321).unwrap();

    let (trajectory, diagnostic) = integrate(&model, &x0, &grid).unwrap();
    assert!(diagnostic.success(), "{}", diagnostic);

    // k_no = 0: all reduced nitrite stays as NO, split between cells and environment
    let delivered = |t: f64| 1200.0 * (-0.045f64).exp() * (1.0 - (-45.0 * t).exp());
    for (i, &t) in grid.iter().enumerate() {
        let row = trajectory.row(i);
        assert_relative_eq!(row[0] + row[1], delivered(t), max_relative = 1e-4, epsilon = 1e-6);
        assert_eq!(row[2], 0.0);
    }

    // Exchange equilibrium k_out·NOcell = k_in·NOenv
    let last = trajectory.final_state().unwrap();
    assert_relative_eq!(5.0 * last[0], 10.0 * last[1], max_relative = 1e-5);
}

#[test]
fn test_branching_from_configuration() {
    let config = SimulationConfig::from_json_str(
        r#"{
            "network": "forced_branching",
            "rates": [45.0, 10.0, 5.0, 2.0],
            "initial_state": [0.0, 0.0, 0.0],
            "doses": [[-0.001, 1200.0], [100.0, 600.0]]
        }"#,
    )
    .unwrap();

    let result = config.run().unwrap();
    assert!(result.success());
    assert_eq!(result.labels, vec!["NOcell", "NOenv", "N2O"]);

    // N2O only accumulates (k_no·NOcell >= 0), up to interpolation round-off
    let n2o = result.series("N2O").unwrap();
    for i in 1..n2o.len() {
        assert!(n2o[i] >= n2o[i - 1] - 1e-9, "N2O decreased at row {}", i);
    }

    // Second dose restarts NO production
    let cell = result.series("NOcell").unwrap();
    assert!(cell[101] > cell[100]);
}

#[test]
fn test_dose_arriving_at_rest_is_not_skipped() {
    // Nothing moves before t = 100, then a single dose drives the exchange
    let model = ForcedBranching::new(
        RateParameters::new(vec![45.0, 10.0, 5.0, 0.0]).unwrap(),
        DoseSchedule::from_pairs(&[(100.0, 1200.0)]).unwrap(),
    )
    .unwrap();
    let grid = reference_grid();

    let (trajectory, diagnostic) = integrate(&model, &DVector::zeros(3), &grid).unwrap();
    assert!(diagnostic.success(), "{}", diagnostic);

    for i in 0..=100 {
        assert_eq!(trajectory.row(i).to_vec(), vec![0.0, 0.0, 0.0]);
    }

    // k_no = 0: the whole dose ends up as NO, at exchange equilibrium
    let last = trajectory.final_state().unwrap();
    assert_relative_eq!(last[0] + last[1], 1200.0, max_relative = 1e-4);
    assert_relative_eq!(5.0 * last[0], 10.0 * last[1], max_relative = 1e-5);
}

#[test]
fn test_every_dose_counts_without_exchange() {
    let model = ForcedBranching::new(
        RateParameters::new(vec![45.0, 0.0, 0.0, 0.0]).unwrap(),
        DoseSchedule::from_pairs(&[(-0.001, 1200.0), (100.0, 1200.0)]).unwrap(),
    )
    .unwrap();
    let grid = reference_grid();
    let first = 1200.0 * (-0.045f64).exp();

    let (adaptive, diagnostic) = integrate(&model, &DVector::zeros(3), &grid).unwrap();
    assert!(diagnostic.success(), "{}", diagnostic);
    assert_relative_eq!(adaptive.row(100)[0], first, max_relative = 1e-5);
    assert_relative_eq!(adaptive.row(320)[0], first + 1200.0, max_relative = 1e-5);

    let (fixed, diagnostic) =
        integrate_with(&model, &DVector::zeros(3), &grid, &SolverConfiguration::fixed_step(100))
            .unwrap();
    assert!(diagnostic.success(), "{}", diagnostic);
    assert_relative_eq!(fixed.row(320)[0], first + 1200.0, max_relative = 1e-4);
}

#[test]
fn test_late_dose_on_coarse_grid() {
    // One reported interval spans the onset
    let model = ForcedBranching::new(
        RateParameters::new(vec![45.0, 10.0, 5.0, 2.0]).unwrap(),
        DoseSchedule::from_pairs(&[(60.0, 1200.0)]).unwrap(),
    )
    .unwrap();
    let grid = TimeGrid::linspace(0.0, 320.0, 5).unwrap();

    let (trajectory, diagnostic) = integrate(&model, &DVector::zeros(3), &grid).unwrap();
    assert!(diagnostic.success(), "{}", diagnostic);

    // Species total = NO2 delivered so far; after the pulse it is the whole dose
    let totals = trajectory.totals();
    assert_eq!(totals[0], 0.0);
    assert_relative_eq!(totals[4], 1200.0, max_relative = 1e-4);
    assert!(trajectory.row(4)[2] > 1000.0);
}

// =================================================================================================
// Network selection and failures
// =================================================================================================

#[test]
fn test_network_is_selected_explicitly() {
    let rates = RateParameters::new(vec![45.0, 10.0, 5.0, 0.0]).unwrap();
    let doses = DoseSchedule::from_pairs(&[(-0.001, 1200.0)]).unwrap();

    let chain = build_model(NetworkKind::SimpleChain, rates.clone(), doses.clone());
    assert!(chain.is_err());

    let branching = build_model(NetworkKind::ForcedBranching, rates, doses).unwrap();
    assert_eq!(branching.name(), "Forced branching");
}

#[test]
fn test_non_finite_derivative_is_reported_not_raised() {
    let scenario = Scenario::new(
        Box::new(FailsAfter { t_fail: 12.5 }),
        DVector::from_vec(vec![0.0, 0.0]),
        TimeGrid::linspace(0.0, 20.0, 21).unwrap(),
    )
    .unwrap();

    let result = Dopri5Solver::new()
        .solve(&scenario, &SolverConfiguration::default())
        .unwrap();

    assert!(!result.success());
    assert!(matches!(result.diagnostic.status, SolverStatus::NonFiniteState { .. }));

    // Rows up to t = 12 are valid, t = 13 shows the NaN, the rest is NaN
    for i in 0..=12 {
        assert_relative_eq!(result.trajectory.row(i)[0], i as f64, epsilon = 1e-9);
    }
    assert!(result.trajectory.row(13)[0].is_nan());
    assert!(result.trajectory.row(20)[0].is_nan());
    assert_eq!(result.diagnostic.completed_rows, 14);
}
