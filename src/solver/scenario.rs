//! Simulation scenario definition
//!
//! A scenario combines a reaction model with its initial state and the
//! reporting time grid.
use crate::error::{ConfigurationError, ValidationError};
use crate::physics::{ReactionModel, State};
use crate::solver::TimeGrid;

/// Simulation scenario
///
/// Defines a specific case to simulate:
/// - Reaction model (equations)
/// - Initial concentrations at the first grid time
/// - Reporting grid
///
/// # Design
///
/// The same scenario can be solved with different numerical methods.
/// This is the "WHAT to solve" (not "HOW to solve"). The initial state is
/// checked against the model when the scenario is built, so a length
/// mismatch never reaches the integrator.
///
/// # Examples
///
/// ```rust
/// use denit_rs::models::{build_model, DoseSchedule, NetworkKind};
/// use denit_rs::physics::RateParameters;
/// use denit_rs::solver::{Scenario, TimeGrid};
/// use nalgebra::DVector;
///
/// let model = build_model(
///     NetworkKind::SimpleChain,
///     RateParameters::new(vec![45.0, 10.0]).unwrap(),
///     DoseSchedule::empty(),
/// ).unwrap();
///
/// let scenario = Scenario::new(
///     model,
///     DVector::from_vec(vec![1200.0, 0.0, 0.0]),
///     TimeGrid::linspace(0.0, 320.0, 321).unwrap(),
/// ).unwrap();
/// assert_eq!(scenario.n_species(), 3);
/// ```
pub struct Scenario {
    /// Reaction model (equations)
    pub model: Box<dyn ReactionModel>,

    /// Concentrations at `grid.start()` \[nM\]
    pub initial: State,

    /// Reporting times
    pub grid: TimeGrid,
}

impl Scenario {
    /// Create a scenario
    ///
    /// # Errors
    ///
    /// - `Validation(StateLength)` if `initial` does not match the model
    /// - `NonFiniteInitialState` if an initial concentration is NaN/Inf
    pub fn new(
        model: Box<dyn ReactionModel>,
        initial: State,
        grid: TimeGrid,
    ) -> Result<Self, ConfigurationError> {
        let scenario = Self { model, initial, grid };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Verify scenario content
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        check_initial_state(self.model.as_ref(), &self.initial)
    }

    /// Get model name
    pub fn get_model_name(&self) -> &str {
        self.model.name()
    }

    pub fn n_species(&self) -> usize {
        self.model.n_species()
    }

    /// Species labels in state order
    pub fn labels(&self) -> Vec<String> {
        self.model.labels().into_iter().map(str::to_string).collect()
    }

    /// Evaluate the model once at the initial state
    pub fn initial_derivative(&self) -> Result<State, ValidationError> {
        self.model.derivative(&self.initial, self.grid.start())
    }
}

/// Initial state must match the model and be finite
pub(crate) fn check_initial_state(
    model: &dyn ReactionModel,
    initial: &State,
) -> Result<(), ConfigurationError> {
    model.check_state(initial)?;

    if let Some((index, &value)) = initial.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(ConfigurationError::NonFiniteInitialState { index, value });
    }

    Ok(())
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.get_model_name())
            .field("species", &self.model.labels())
            .field("initial", &self.initial.as_slice())
            .field("t_start", &self.grid.start())
            .field("t_end", &self.grid.end())
            .field("points", &self.grid.len())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
