//! Reaction physics
//!
//! This module provides the traits and value types shared by every reaction
//! network. A reaction model encapsulates the kinetics of a system: it maps a
//! state and a time to the rate of change of every species.
//!
//! # Core Concepts
//!
//! - **Reaction Model**: Computes dX/dt at a given state and time
//! - **Rate Parameters**: Validated, immutable rate constants (1/min)
//! - **State / Trajectory**: Concentrations (nM) at one instant / over a grid
//! - **Species**: Type-safe identifier for each tracked pool
//!
//! # Architecture
//!
//! Reaction models are **separate from numerical solvers**:
//! - The model provides the **equations** (kinetics)
//! - The solver provides the **method** to integrate them (numerics)
//!
//! # Implementing a New Reaction Model
//!
//! ```rust
//! use denit_rs::error::ValidationError;
//! use denit_rs::physics::{ReactionModel, Species, State};
//!
//! struct NitriteLeak {
//!     rate: f64,
//! }
//!
//! impl ReactionModel for NitriteLeak {
//!     fn species(&self) -> &[Species] {
//!         &[Species::Nitrite]
//!     }
//!
//!     fn derivative(&self, state: &State, _t: f64) -> Result<State, ValidationError> {
//!         self.check_state(state)?;
//!         Ok(state * -self.rate)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Nitrite leak"
//!     }
//! }
//! ```

// module declaration
pub mod traits;
pub mod data;
pub mod parameters;

// re-export commonly used types for convenience
pub use data::{State, Trajectory};
pub use parameters::RateParameters;
pub use traits::{
    ReactionModel,
    Species, };
