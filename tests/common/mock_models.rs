//! Mock reaction models for testing
//!
//! These models have known analytical solutions, making them
//! ideal for validating numerical solver accuracy.

use denit_rs::error::ValidationError;
use denit_rs::physics::{ReactionModel, Species, State};
use nalgebra::DVector;

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// First-order NO loss: dy/dt = -k*y
///
/// Analytical solution: y(t) = y₀ * exp(-k*t)
pub struct ExponentialDecay {
    pub decay_rate: f64, // k in dy/dt = -k*y
}

impl ExponentialDecay {
    pub fn new(decay_rate: f64) -> Self {
        Self { decay_rate }
    }

    /// Compute analytical solution at time t
    pub fn analytical_solution(&self, t: f64, y0: f64) -> f64 {
        y0 * (-self.decay_rate * t).exp()
    }
}

impl ReactionModel for ExponentialDecay {
    fn species(&self) -> &[Species] {
        &[Species::NitricOxide]
    }

    fn derivative(&self, state: &State, _t: f64) -> Result<State, ValidationError> {
        self.check_state(state)?;
        Ok(state * -self.decay_rate)
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Constant Growth: dy/dt = c
// =================================================================================================

/// Constant N2O production: dy/dt = c
///
/// Analytical solution: y(t) = y₀ + c*t
pub struct ConstantGrowth {
    pub growth_rate: f64,
}

impl ConstantGrowth {
    pub fn new(growth_rate: f64) -> Self {
        Self { growth_rate }
    }
}

impl ReactionModel for ConstantGrowth {
    fn species(&self) -> &[Species] {
        &[Species::NitrousOxide]
    }

    fn derivative(&self, state: &State, _t: f64) -> Result<State, ValidationError> {
        self.check_state(state)?;
        Ok(DVector::from_element(1, self.growth_rate))
    }

    fn name(&self) -> &str {
        "Constant Growth"
    }
}

// =================================================================================================
// Fails After: NaN rate once t >= t_fail
// =================================================================================================

/// Unit production rate until `t_fail`, NaN afterwards
pub struct FailsAfter {
    pub t_fail: f64,
}

impl ReactionModel for FailsAfter {
    fn species(&self) -> &[Species] {
        &[Species::NitricOxide, Species::NitrousOxide]
    }

    fn derivative(&self, state: &State, t: f64) -> Result<State, ValidationError> {
        self.check_state(state)?;
        let rate = if t < self.t_fail { 1.0 } else { f64::NAN };
        Ok(DVector::from_vec(vec![rate, 0.0]))
    }

    fn name(&self) -> &str {
        "Fails After"
    }
}
