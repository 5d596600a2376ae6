//! Batch solving of independent scenarios
//!
//! Models hold no shared mutable state, so scenarios can be solved
//! concurrently without locking. With the `parallel` feature the batch runs on
//! rayon's thread pool; otherwise sequentially. Both paths return results in
//! input order, and each result is identical to a single `solve` call.
//!
//! ```rust
//! use denit_rs::models::{build_model, DoseSchedule, NetworkKind};
//! use denit_rs::physics::RateParameters;
//! use denit_rs::solver::{solve_many, Dopri5Solver, Scenario, SolverConfiguration, TimeGrid};
//! use nalgebra::DVector;
//!
//! // Sweep the NO reduction rate
//! let scenarios: Vec<Scenario> = [5.0, 10.0, 20.0]
//!     .iter()
//!     .map(|k2| {
//!         let model = build_model(
//!             NetworkKind::SimpleChain,
//!             RateParameters::new(vec![45.0, *k2]).unwrap(),
//!             DoseSchedule::empty(),
//!         ).unwrap();
//!         Scenario::new(
//!             model,
//!             DVector::from_vec(vec![1200.0, 0.0, 0.0]),
//!             TimeGrid::linspace(0.0, 10.0, 11).unwrap(),
//!         ).unwrap()
//!     })
//!     .collect();
//!
//! let results = solve_many(&Dopri5Solver::new(), &scenarios, &SolverConfiguration::default());
//! assert_eq!(results.len(), 3);
//! assert!(results.iter().all(|r| r.as_ref().unwrap().success()));
//! ```

use crate::error::ConfigurationError;
use crate::solver::{Scenario, SimulationResult, Solver, SolverConfiguration};

/// Solve every scenario with the same solver and configuration
///
/// Each entry is the outcome of `solver.solve(scenario, config)`, in the
/// order of `scenarios`.
pub fn solve_many<S: Solver + ?Sized>(
    solver: &S,
    scenarios: &[Scenario],
    config: &SolverConfiguration,
) -> Vec<Result<SimulationResult, ConfigurationError>> {
    log::debug!("{}: solving {} scenarios", solver.name(), scenarios.len());

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;

        scenarios
            .par_iter()
            .map(|scenario| solver.solve(scenario, config))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        scenarios
            .iter()
            .map(|scenario| solver.solve(scenario, config))
            .collect()
    }
}
