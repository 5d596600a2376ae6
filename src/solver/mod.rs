//! Numerical solvers
//!
//! This module provides traits and implementations for numerical solvers.
//! A numerical solver applies a time integration method to the equations
//! provided by a reaction model within a specific scenario.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Reaction model (equations)
//!    - Initial concentrations
//!    - Reporting time grid
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Adaptive (tolerances, step budget) or fixed substeps
//!
//! 3. **Solver** (`Solver` trait) - The numerical method
//!    - Applies the numerical scheme
//!    - Returns the trajectory on the grid plus a diagnostic
//!    - Independent of the chemistry
//!
//! # Module Organization
//!
//! - **`grid`**: `TimeGrid`, the validated reporting times
//! - **`scenario`**: `Scenario`, model + initial state + grid
//! - **`traits`**: `Solver`, `SolverType`, `SolverConfiguration`,
//!   `SolverStatus`, `SolverDiagnostic`, `SimulationResult`
//! - **`methods`**: `Dopri5Solver` (adaptive, default) and `RK4Solver` (fixed step)
//! - **`sweep`**: solve many scenarios at once (rayon with feature `parallel`)
//!
//! # Quick Start Example
//!
//! ```rust
//! use denit_rs::models::{build_model, DoseSchedule, NetworkKind};
//! use denit_rs::physics::RateParameters;
//! use denit_rs::solver::{Dopri5Solver, Scenario, Solver, SolverConfiguration, TimeGrid};
//! use nalgebra::DVector;
//!
//! // 1. Scenario (WHAT to solve)
//! let model = build_model(
//!     NetworkKind::SimpleChain,
//!     RateParameters::new(vec![45.0, 10.0]).unwrap(),
//!     DoseSchedule::empty(),
//! ).unwrap();
//! let scenario = Scenario::new(
//!     model,
//!     DVector::from_vec(vec![1200.0, 0.0, 0.0]),
//!     TimeGrid::linspace(0.0, 320.0, 321).unwrap(),
//! ).unwrap();
//!
//! // 2. Configuration (HOW to solve)
//! let config = SolverConfiguration::default();
//!
//! // 3. Solve
//! let result = Dopri5Solver::new().solve(&scenario, &config).unwrap();
//! assert!(result.success());
//! assert_eq!(result.trajectory.rows(), 321);
//! ```
//!
//! # Error Handling
//!
//! `solve` returns `Err(ConfigurationError)` only when the run cannot start.
//! Numerical trouble (step underflow, NaN/Inf, step budget) yields `Ok` with a
//! failed [`SolverDiagnostic`]: the rows computed before the failure are
//! kept, the row where a non-finite value appeared shows it, the rest is NaN.

// =================================================================================================
// Module Declarations
// =================================================================================================
mod grid;
mod traits;
mod scenario;
mod methods;
pub mod sweep;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{
    SimulationResult,
    Solver,
    SolverConfiguration,
    SolverDiagnostic,
    SolverStatus,
    SolverType,
};

pub use grid::TimeGrid;
pub use scenario::Scenario;

pub use methods::{Dopri5Solver, RK4Solver};
pub use sweep::solve_many;

use crate::error::ConfigurationError;
use crate::physics::{ReactionModel, State, Trajectory};

// =================================================================================================
// Entry points
// =================================================================================================

/// Integrate `model` from `x0` and report the state at every grid time
///
/// Uses the adaptive Dormand-Prince method with the default tolerances
/// (`rtol = 1e-6`, `atol = 1e-9`).
///
/// # Returns
///
/// A trajectory with one row per grid point (row 0 is `x0` bit for bit) and
/// the run diagnostic.
///
/// # Errors
///
/// `ConfigurationError` if `x0` does not match the model or is not finite.
///
/// # Example
///
/// ```rust
/// use denit_rs::models::SimpleChain;
/// use denit_rs::physics::RateParameters;
/// use denit_rs::solver::{integrate, TimeGrid};
/// use nalgebra::DVector;
///
/// let model = SimpleChain::new(RateParameters::new(vec![45.0, 10.0]).unwrap()).unwrap();
/// let x0 = DVector::from_vec(vec![1200.0, 0.0, 0.0]);
/// let grid = TimeGrid::linspace(0.0, 10.0, 11).unwrap();
///
/// let (trajectory, diagnostic) = integrate(&model, &x0, &grid).unwrap();
/// assert!(diagnostic.success());
/// assert!((trajectory.row(10)[0] - 750.0).abs() < 1e-6);
/// ```
pub fn integrate(
    model: &dyn ReactionModel,
    x0: &State,
    grid: &TimeGrid,
) -> Result<(Trajectory, SolverDiagnostic), ConfigurationError> {
    integrate_with(model, x0, grid, &SolverConfiguration::default())
}

/// Same as [`integrate`] with an explicit configuration
///
/// `SolverType::Adaptive` selects Dormand-Prince, `SolverType::FixedStep`
/// selects RK4.
pub fn integrate_with(
    model: &dyn ReactionModel,
    x0: &State,
    grid: &TimeGrid,
    config: &SolverConfiguration,
) -> Result<(Trajectory, SolverDiagnostic), ConfigurationError> {
    config.validate()?;
    scenario::check_initial_state(model, x0)?;

    let outcome = match &config.solver_type {
        SolverType::Adaptive { .. } => {
            let settings = methods::dopri5::AdaptiveSettings::from_configuration(config)?;
            methods::dopri5::integrate_adaptive(model, x0, grid, &settings)
        }
        SolverType::FixedStep { substeps } => {
            methods::rk4::integrate_fixed(model, x0, grid, *substeps)
        }
    };

    Ok(outcome)
}

// =================================================================================================
// Helper Functions
// =================================================================================================

/// Work counters shared by the integrators
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counters {
    pub evaluations: usize,
    pub accepted: usize,
    pub rejected: usize,
}

impl Counters {
    pub(crate) fn diagnostic(&self, status: SolverStatus, completed_rows: usize) -> SolverDiagnostic {
        SolverDiagnostic {
            status,
            evaluations: self.evaluations,
            accepted_steps: self.accepted,
            rejected_steps: self.rejected,
            completed_rows,
        }
    }
}

/// Evaluate the model, turning a rejection into a solver status
pub(crate) fn evaluate(
    model: &dyn ReactionModel,
    state: &State,
    t: f64,
    counters: &mut Counters,
) -> Result<State, SolverStatus> {
    counters.evaluations += 1;
    model
        .derivative(state, t)
        .map_err(|e| SolverStatus::ModelFailure { t, message: e.to_string() })
}

/// Check a state or derivative for numerical issues
///
/// NaN comes from 0/0 or Inf - Inf in a rate expression, Inf from overflow.
/// Either one is reported, never silently carried.
pub(crate) fn validate_state(state: &State) -> bool {
    state.iter().all(|x| x.is_finite())
}

/// Model breakpoints in `[start, end)`, sorted and deduplicated
pub(crate) fn breakpoints_within(model: &dyn ReactionModel, start: f64, end: f64) -> Vec<f64> {
    let mut points: Vec<f64> = model
        .breakpoints()
        .into_iter()
        .filter(|b| b.is_finite() && *b >= start && *b < end)
        .collect();
    points.sort_by(f64::total_cmp);
    points.dedup();
    points
}

/// Smallest representable time after `t`
///
/// Derivatives at a breakpoint are taken here: the right-hand limit of a
/// strict-onset step.
pub(crate) fn just_after(t: f64) -> f64 {
    if t == 0.0 {
        f64::from_bits(1)
    } else if t > 0.0 {
        f64::from_bits(t.to_bits() + 1)
    } else {
        f64::from_bits(t.to_bits() - 1)
    }
}

/// Log the end of a run
pub(crate) fn log_outcome(solver: &str, model: &str, diagnostic: &SolverDiagnostic) {
    if diagnostic.success() {
        log::debug!("{solver}: {model} finished, {diagnostic}");
    } else {
        log::warn!(
            "{solver}: {model} stopped after {} rows: {diagnostic}",
            diagnostic.completed_rows
        );
    }
}

// =================================================================================================
// Tests
// =================================================================================================
