//! denit-rs: Denitrification Reaction-Network Simulation
//!
//! Simulates the time evolution of nitrogen-oxide species produced by microbial
//! denitrification (NO2 → NO → N2O) as a system of ordinary differential
//! equations, integrated with an adaptive Runge-Kutta method and reported on a
//! fixed time grid.
//!
//! # Architecture
//!
//! denit-rs is built on two core principles:
//!
//! 1. **Separation of Chemistry and Numerics**
//!    - Reaction models define rate equations (what to solve)
//!    - Numerical solvers provide methods (how to solve)
//!
//! 2. **Explicit, immutable inputs**
//!    - The network topology is a tagged variant ([`models::NetworkKind`])
//!    - Rate constants and dose schedules are validated once and never mutated
//!    - No global state: runs can execute concurrently
//!
//! # Quick Start
//!
//! ```rust
//! use denit_rs::models::{build_model, DoseSchedule, NetworkKind};
//! use denit_rs::physics::RateParameters;
//! use denit_rs::solver::{Dopri5Solver, Scenario, Solver, SolverConfiguration, TimeGrid};
//! use nalgebra::DVector;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. Reaction network and scenario
//! let model = build_model(
//!     NetworkKind::SimpleChain,
//!     RateParameters::new(vec![45.0, 10.0])?,
//!     DoseSchedule::empty(),
//! )?;
//! let scenario = Scenario::new(
//!     model,
//!     DVector::from_vec(vec![1200.0, 0.0, 0.0]),
//!     TimeGrid::linspace(0.0, 320.0, 321)?,
//! )?;
//!
//! // 2. Solver configuration
//! let config = SolverConfiguration::adaptive(1e-6, 1e-9);
//!
//! // 3. Run simulation
//! let result = Dopri5Solver::new().solve(&scenario, &config)?;
//!
//! // 4. Access results
//! assert!(result.success());
//! let n2o = result.series("N2O").unwrap();
//! assert!((n2o[320] - 3200.0).abs() < 1e-6);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`physics`]: Model contract, species, rate parameters, state containers
//! - [`models`]: Concrete networks and substrate dosing
//! - [`solver`]: Time grid, scenario, integrators, batch solving
//! - [`config`]: JSON run description
//! - [`output`]: Result export
//! - [`error`]: Error types

// Core modules
pub mod error;
pub mod physics;

pub mod models;
pub mod solver;

pub mod config;
pub mod output;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use denit_rs::prelude::*;
    //!
    //! let result = SimulationConfig::default().run().unwrap();
    //! assert!(result.success());
    //! ```
    pub use crate::config::SimulationConfig;
    pub use crate::error::{ConfigurationError, ValidationError};
    pub use crate::models::{build_model,
                            DoseSchedule,
                            ForcedBranching,
                            NetworkKind,
                            SimpleChain};
    pub use crate::physics::{RateParameters,
                             ReactionModel,
                             Species,
                             State,
                             Trajectory};
    pub use crate::solver::{integrate,
                            Dopri5Solver,
                            RK4Solver,
                            Scenario,
                            SimulationResult,
                            Solver,
                            SolverConfiguration,
                            SolverDiagnostic,
                            SolverStatus,
                            SolverType,
                            TimeGrid};
}
