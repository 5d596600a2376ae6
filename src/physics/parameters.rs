//! Rate constants of a reaction network
//!
//! One entry per reaction step, in 1/min. Steps that complete faster than the
//! simulated resolution (NO3 → NO2) are not represented; a zero-valued entry
//! is the way to switch a modeled step off.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Ordered, validated rate constants
///
/// # Invariants
///
/// - Every entry is finite and non-negative
/// - Immutable once built: the solver may evaluate the model many times per
///   step and relies on identical parameters for every evaluation
///
/// # Example
///
/// ```rust
/// use denit_rs::physics::RateParameters;
///
/// let rates = RateParameters::new(vec![45.0, 10.0]).unwrap();
/// assert_eq!(rates.len(), 2);
/// assert_eq!(rates[0], 45.0);
///
/// assert!(RateParameters::new(vec![45.0, -1.0]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct RateParameters {
    values: Vec<f64>,
}

impl RateParameters {
    /// Build from raw values, rejecting negative or non-finite constants
    pub fn new(values: Vec<f64>) -> Result<Self, ValidationError> {
        for (index, &value) in values.iter().enumerate() {
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteRate { index, value });
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeRate { index, value });
            }
        }
        Ok(Self { values })
    }

    /// Literal constants already known to satisfy the invariants
    pub(crate) fn from_valid(values: Vec<f64>) -> Self {
        debug_assert!(values.iter().all(|v| v.is_finite() && *v >= 0.0));
        Self { values }
    }

    /// Number of rate constants
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Rate constant of step `index`, if present
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Check the count expected by a model
    pub fn expect_len(&self, model: &str, expected: usize) -> Result<(), ValidationError> {
        if self.values.len() != expected {
            return Err(ValidationError::RateCount {
                model: model.to_string(),
                expected,
                found: self.values.len(),
            });
        }
        Ok(())
    }
}

impl Index<usize> for RateParameters {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

impl TryFrom<Vec<f64>> for RateParameters {
    type Error = ValidationError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<RateParameters> for Vec<f64> {
    fn from(rates: RateParameters) -> Self {
        rates.values
    }
}
