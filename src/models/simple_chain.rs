//! Sequential denitrification chain NO2 → NO → N2O
//!
//! # Physical Model
//!
//! ```text
//!          k1           k2
//!   NO2 -------> NO -------> N2O
//! ```
//!
//! State vector: `X = [NO2, NO, N2O]` \[nM\], rates `R = [k1, k2]` \[1/min\].
//!
//! The nitrite pool is treated as a large, non-limiting reservoir consumed at a
//! constant rate, so every step is zero-order in concentration:
//!
//! ```text
//! d[NO2]/dt = -k1
//! d[NO]/dt  =  k1 - k2
//! d[N2O]/dt =  k2
//! ```
//!
//! The derivative is independent of the state. Nothing is clamped: once the
//! reservoir is exhausted, `[NO2]` keeps falling below zero, which flags
//! parameters inconsistent with the reservoir size. The species total is
//! conserved because the three derivatives sum to zero.
//!
//! # Example
//!
//! ```rust
//! use denit_rs::models::SimpleChain;
//! use denit_rs::physics::{RateParameters, ReactionModel};
//! use nalgebra::DVector;
//!
//! let model = SimpleChain::new(RateParameters::new(vec![45.0, 10.0]).unwrap()).unwrap();
//! let dx = model.derivative(&DVector::from_vec(vec![1200.0, 0.0, 0.0]), 0.0).unwrap();
//!
//! assert_eq!(dx.as_slice(), &[-45.0, 35.0, 10.0]);
//! ```

use crate::error::ValidationError;
use crate::physics::{RateParameters, ReactionModel, Species, State};
use nalgebra::DVector;

const SPECIES: [Species; 3] = [Species::Nitrite, Species::NitricOxide, Species::NitrousOxide];

/// NO2 → NO → N2O with constant-rate steps
#[derive(Clone, Debug)]
pub struct SimpleChain {
    /// NO2 → NO rate k1 \[nM/min\]
    nitrite_reduction: f64,
    /// NO → N2O rate k2 \[nM/min\]
    no_reduction: f64,
    rates: RateParameters,
}

impl SimpleChain {
    /// Number of rate constants expected: `[k1, k2]`
    pub const RATE_COUNT: usize = 2;

    /// Create the chain from `[k1, k2]`
    ///
    /// # Errors
    ///
    /// `ValidationError::RateCount` unless exactly two rates are given.
    pub fn new(rates: RateParameters) -> Result<Self, ValidationError> {
        rates.expect_len("Simple chain", Self::RATE_COUNT)?;

        Ok(Self {
            nitrite_reduction: rates[0],
            no_reduction: rates[1],
            rates,
        })
    }

    pub fn rates(&self) -> &RateParameters {
        &self.rates
    }

    /// Closed-form solution at time `t` from `initial` at `t0`
    ///
    /// Exact because every derivative is constant.
    pub fn analytical_solution(&self, initial: &State, t0: f64, t: f64) -> State {
        let elapsed = t - t0;
        DVector::from_vec(vec![
            initial[0] - self.nitrite_reduction * elapsed,
            initial[1] + (self.nitrite_reduction - self.no_reduction) * elapsed,
            initial[2] + self.no_reduction * elapsed,
        ])
    }

    /// Time at which the nitrite reservoir formally reaches zero
    ///
    /// `None` when k1 is zero (the reservoir never depletes).
    pub fn depletion_time(&self, initial_nitrite: f64, t0: f64) -> Option<f64> {
        (self.nitrite_reduction > 0.0).then(|| t0 + initial_nitrite / self.nitrite_reduction)
    }
}

impl ReactionModel for SimpleChain {
    fn species(&self) -> &[Species] {
        &SPECIES
    }

    fn derivative(&self, state: &State, _t: f64) -> Result<State, ValidationError> {
        self.check_state(state)?;

        Ok(DVector::from_vec(vec![
            -self.nitrite_reduction,
            self.nitrite_reduction - self.no_reduction,
            self.no_reduction,
        ]))
    }

    fn name(&self) -> &str {
        "Simple chain"
    }

    fn description(&self) -> Option<&str> {
        Some("NO2 -> NO -> N2O with constant (zero-order) step rates")
    }
}

// =================================================================================================
// Tests
// =================================================================================================
