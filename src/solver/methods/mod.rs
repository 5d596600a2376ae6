//! Numerical methods for solving the rate equations
//!
//! This module contains concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Architecture
//!
//! The separation between abstract solver interface (`solver::traits`) and concrete
//! implementations (`solver::methods`) lets new methods be added without touching
//! the `Solver` trait.
//!
//! # Available Methods
//!
//! - **[`Dopri5Solver`]**: Dormand-Prince 5(4), adaptive step with error control
//!   - Order: fifth-order solution, fourth-order error estimate
//!   - Cost: 6 function evaluations per attempted step (first-same-as-last)
//!   - Use: **default**, every production run
//!
//! - **[`RK4Solver`]**: Classical fourth-order Runge-Kutta, fixed substeps
//!   - Order: Fourth-order O(dt⁴)
//!   - Cost: 4 function evaluations per substep
//!   - Use: cross-checks and benchmarks
//!
//! # Design Philosophy
//!
//! Each solver is:
//! - **Self-contained**: No shared mutable state
//! - **Stateless**: Can be reused for multiple simulations and threads
//! - **Deterministic**: identical inputs give bit-identical trajectories

pub(crate) mod dopri5;
pub(crate) mod rk4;

// Re-exports for convenience
pub use dopri5::Dopri5Solver;
pub use rk4::RK4Solver;
