//! Reaction model traits and types
//!
//! This module defines the core API for reaction networks:
//! - `ReactionModel`: trait for all reaction networks
//! - `Species`: type-safe identifiers for the tracked pools

use crate::error::ValidationError;
use crate::physics::data::State;
use std::fmt;

// =================================================================================================
// Species (Type-safe Identifiers)
// =================================================================================================

/// Chemical pools tracked by the denitrification networks
///
/// All concentrations are in nM (nmol/L).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Nitrite, NO2⁻
    Nitrite,

    /// Nitric oxide (single well-mixed pool)
    NitricOxide,

    /// Nitrous oxide, N2O
    NitrousOxide,

    /// Nitric oxide inside the cells
    NitricOxideCell,

    /// Nitric oxide in the surrounding environment
    NitricOxideEnv,
}

impl Species {
    /// Short label used in reports and column headers
    pub fn label(&self) -> &'static str {
        match self {
            Species::Nitrite => "NO2",
            Species::NitricOxide => "NO",
            Species::NitrousOxide => "N2O",
            Species::NitricOxideCell => "NOcell",
            Species::NitricOxideEnv => "NOenv",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =================================================================================================
// Reaction Model Trait
// =================================================================================================

/// Trait for reaction networks
///
/// # Responsibility
/// Computes dX/dt for every species at a given state and time.
/// Does NOT integrate it (that's the Solver's job).
///
/// # Contract
///
/// - `derivative` returns a vector of the same length as `species()`
/// - It is pure: no interior mutability, no dependence on call order. The
///   adaptive solver evaluates it at trial points that may be rejected.
/// - Non-finite results are returned as-is; the solver reports them.
pub trait ReactionModel: Send + Sync {
    /// Species in state-vector order
    fn species(&self) -> &[Species];

    /// Number of species in the state vector
    fn n_species(&self) -> usize {
        self.species().len()
    }

    /// Right-hand side f(X, t) of dX/dt = f(X, t)
    ///
    /// # Errors
    ///
    /// `ValidationError::StateLength` when `state` does not hold exactly
    /// `n_species()` concentrations.
    fn derivative(&self, state: &State, t: f64) -> Result<State, ValidationError>;

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&str> {
        None
    }

    /// Times at which `derivative` jumps (e.g. dose onsets)
    ///
    /// The right-hand side is assumed smooth between breakpoints. Solvers end
    /// a step exactly on each breakpoint and restart from the right-hand limit
    /// there, so a jump is never stepped over. Order and duplicates do not
    /// matter.
    fn breakpoints(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Species labels in state-vector order
    fn labels(&self) -> Vec<&'static str> {
        self.species().iter().map(Species::label).collect()
    }

    /// Reject a state vector of the wrong length
    fn check_state(&self, state: &State) -> Result<(), ValidationError> {
        if state.len() != self.n_species() {
            return Err(ValidationError::StateLength {
                model: self.name().to_string(),
                expected: self.n_species(),
                found: state.len(),
            });
        }
        Ok(())
    }
}
