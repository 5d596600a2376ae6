//! Substrate dosing profiles
//!
//! Defines the external NO2 input supplied to a network as a function of TIME.
//!
//! # Physics
//!
//! Each dose adds `concentration` nM of substrate at `onset` into a pool that
//! is itself consumed at the first reaction rate `k`. A single dose therefore
//! contributes a delayed step followed by exponential decay:
//!
//! ```text
//! F_i(t) = c_i · exp(-k · (t - t_i))   for t > t_i
//!        = 0                           for t <= t_i
//! ```
//!
//! and the forcing is the superposition `F(t) = Σ F_i(t)`.
//!
//! # Onset Convention
//!
//! The gate is strict: at `t == t_i` the dose contributes exactly zero, and the
//! full `c_i` appears immediately after. A bolus meant to be present at the
//! start of a run is given a slightly negative onset (e.g. `-0.001`).
//!
//! # Example
//!
//! ```rust
//! use denit_rs::models::{DoseEvent, DoseForcing, DoseSchedule};
//!
//! let schedule = DoseSchedule::new(vec![
//!     DoseEvent::new(-0.001, 1200.0),
//!     DoseEvent::new(60.0, 600.0),
//! ]).unwrap();
//! let forcing = DoseForcing::new(schedule, 45.0);
//!
//! assert!(forcing.evaluate(0.0) > 0.0);   // bolus already present
//! assert_eq!(forcing.evaluate(-1.0), 0.0); // before every onset
//! ```

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

// =================================================================================================
// Dose events and schedules
// =================================================================================================

/// One discrete substrate addition
///
/// - `onset` : Time of the addition \[min\] (may be negative)
/// - `concentration` : Added concentration \[nM\]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct DoseEvent {
    pub onset: f64,
    pub concentration: f64,
}

impl DoseEvent {
    pub fn new(onset: f64, concentration: f64) -> Self {
        Self { onset, concentration }
    }
}

impl From<(f64, f64)> for DoseEvent {
    fn from((onset, concentration): (f64, f64)) -> Self {
        Self::new(onset, concentration)
    }
}

impl From<DoseEvent> for (f64, f64) {
    fn from(event: DoseEvent) -> Self {
        (event.onset, event.concentration)
    }
}

/// Ordered list of dose events
///
/// Events are kept in the order given. Ascending onsets are conventional but
/// not required: contributions superpose, so duplicate or out-of-order onsets
/// are summed like any other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DoseEvent>", into = "Vec<DoseEvent>")]
pub struct DoseSchedule {
    events: Vec<DoseEvent>,
}

impl DoseSchedule {
    /// Build a schedule, rejecting non-finite onsets or concentrations
    pub fn new(events: Vec<DoseEvent>) -> Result<Self, ValidationError> {
        for (index, event) in events.iter().enumerate() {
            if !event.onset.is_finite() || !event.concentration.is_finite() {
                return Err(ValidationError::NonFiniteDose {
                    index,
                    onset: event.onset,
                    concentration: event.concentration,
                });
            }
        }
        Ok(Self { events })
    }

    /// Schedule without any dose (forcing is identically zero)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from `(onset, concentration)` pairs
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, ValidationError> {
        Self::new(pairs.iter().copied().map(DoseEvent::from).collect())
    }

    pub fn events(&self) -> &[DoseEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Earliest onset, if any
    pub fn first_onset(&self) -> Option<f64> {
        self.events.iter().map(|e| e.onset).reduce(f64::min)
    }

    /// Onset of every event, in schedule order
    pub fn onsets(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.onset).collect()
    }

    /// Total concentration added over the whole schedule \[nM\]
    pub fn total_dose(&self) -> f64 {
        self.events.iter().map(|e| e.concentration).sum()
    }
}

impl TryFrom<Vec<DoseEvent>> for DoseSchedule {
    type Error = ValidationError;

    fn try_from(events: Vec<DoseEvent>) -> Result<Self, Self::Error> {
        Self::new(events)
    }
}

impl From<DoseSchedule> for Vec<DoseEvent> {
    fn from(schedule: DoseSchedule) -> Self {
        schedule.events
    }
}

// =================================================================================================
// Forcing profile
// =================================================================================================

/// Superposition of delayed, exponentially decaying dose responses
///
/// Pure function of time; holds only the read-only schedule and the decay
/// constant, so it can be shared by reference between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct DoseForcing {
    schedule: DoseSchedule,
    decay_rate: f64,
}

impl DoseForcing {
    /// Create a forcing profile
    ///
    /// # Arguments
    ///
    /// * `schedule` - Dose events
    /// * `decay_rate` - Consumption rate of the dosed pool \[1/min\]
    pub fn new(schedule: DoseSchedule, decay_rate: f64) -> Self {
        Self { schedule, decay_rate }
    }

    pub fn schedule(&self) -> &DoseSchedule {
        &self.schedule
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    /// Input concentration at time `t` \[nM\]
    pub fn evaluate(&self, t: f64) -> f64 {
        self.schedule
            .events
            .iter()
            .filter(|event| t - event.onset > 0.0)
            .map(|event| event.concentration * (-self.decay_rate * (t - event.onset)).exp())
            .sum()
    }

    /// Evaluate at multiple time points (e.g. to plot the forcing curve)
    pub fn evaluate_series(&self, times: &[f64]) -> Vec<f64> {
        times.iter().map(|&t| self.evaluate(t)).collect()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
