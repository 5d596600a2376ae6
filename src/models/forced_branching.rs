//! Dosed denitrification with NO exchange between cells and environment
//!
//! # Physical Model
//!
//! ```text
//!                  k_nitrite              k_no
//!   NO2 (dosed) -----------> NOcell -----------> N2O
//!                             |  ^
//!                       k_out |  | k_in
//!                             v  |
//!                            NOenv
//! ```
//!
//! State vector: `X = [NOcell, NOenv, N2O]` \[nM\],
//! rates `R = [k_nitrite, k_in, k_out, k_no]` \[1/min\].
//!
//! Nitrite is not a state variable: its availability is the forcing profile
//! `F(t)` built from the dose schedule, decaying at `k_nitrite` (the first
//! rate), so the nitrite reduction flux into the cells is `k_nitrite · F(t)`.
//!
//! ```text
//! d[NOcell]/dt = k_nitrite·F(t) + k_in·[NOenv] - k_out·[NOcell]
//! d[NOenv]/dt  = k_out·[NOcell] - k_in·[NOenv]
//! d[N2O]/dt    = k_no·[NOcell]
//! ```
//!
//! The model holds its forcing as a collaborator; nothing is looked up
//! globally, so the same configuration can be evaluated from several threads.
//!
//! # Example
//!
//! ```rust
//! use denit_rs::models::{DoseSchedule, ForcedBranching};
//! use denit_rs::physics::{RateParameters, ReactionModel};
//! use nalgebra::DVector;
//!
//! let rates = RateParameters::new(vec![45.0, 10.0, 5.0, 0.0]).unwrap();
//! let doses = DoseSchedule::from_pairs(&[(-0.001, 1200.0)]).unwrap();
//! let model = ForcedBranching::new(rates, doses).unwrap();
//!
//! let dx = model.derivative(&DVector::zeros(3), 0.0).unwrap();
//! assert_eq!(dx[0], 45.0 * model.forcing().evaluate(0.0));
//! ```

use crate::error::ValidationError;
use crate::models::{DoseForcing, DoseSchedule};
use crate::physics::{RateParameters, ReactionModel, Species, State};
use nalgebra::DVector;

const SPECIES: [Species; 3] = [
    Species::NitricOxideCell,
    Species::NitricOxideEnv,
    Species::NitrousOxide,
];

/// Dosed NO2 feeding a cell NO pool that exchanges with the environment
#[derive(Clone, Debug)]
pub struct ForcedBranching {
    // ==================== Rate constants ====================
    /// NO2 → NOcell \[1/min\]
    nitrite_reduction: f64,
    /// NOenv → NOcell \[1/min\]
    uptake: f64,
    /// NOcell → NOenv \[1/min\]
    release: f64,
    /// NOcell → N2O \[1/min\]
    no_reduction: f64,
    rates: RateParameters,

    // ==================== Substrate input ====================
    forcing: DoseForcing,
}

impl ForcedBranching {
    /// Number of rate constants expected: `[k_nitrite, k_in, k_out, k_no]`
    pub const RATE_COUNT: usize = 4;

    /// Create the network; the forcing decays at the first rate constant
    ///
    /// # Errors
    ///
    /// `ValidationError::RateCount` unless exactly four rates are given.
    pub fn new(rates: RateParameters, doses: DoseSchedule) -> Result<Self, ValidationError> {
        rates.expect_len("Forced branching", Self::RATE_COUNT)?;

        let forcing = DoseForcing::new(doses, rates[0]);

        Ok(Self {
            nitrite_reduction: rates[0],
            uptake: rates[1],
            release: rates[2],
            no_reduction: rates[3],
            rates,
            forcing,
        })
    }

    /// Substrate forcing profile
    pub fn forcing(&self) -> &DoseForcing {
        &self.forcing
    }

    pub fn rates(&self) -> &RateParameters {
        &self.rates
    }

    /// Nitrite reduction flux into the cell NO pool at time `t` \[nM/min\]
    pub fn nitrite_flux(&self, t: f64) -> f64 {
        self.nitrite_reduction * self.forcing.evaluate(t)
    }
}

impl ReactionModel for ForcedBranching {
    fn species(&self) -> &[Species] {
        &SPECIES
    }

    fn derivative(&self, state: &State, t: f64) -> Result<State, ValidationError> {
        self.check_state(state)?;

        let no_cell = state[0];
        let no_env = state[1];

        let d_cell = self.nitrite_flux(t) + no_env * self.uptake - no_cell * self.release;
        let d_env = no_cell * self.release - no_env * self.uptake;
        let d_n2o = self.no_reduction * no_cell;

        Ok(DVector::from_vec(vec![d_cell, d_env, d_n2o]))
    }

    /// Dose onsets: the forcing steps up at each one
    fn breakpoints(&self) -> Vec<f64> {
        self.forcing.schedule().onsets()
    }

    fn name(&self) -> &str {
        "Forced branching"
    }

    fn description(&self) -> Option<&str> {
        Some("Dosed NO2 -> NOcell <-> NOenv, NOcell -> N2O")
    }
}

// =================================================================================================
// Tests
// =================================================================================================
