//! Error types
//!
//! Two layers of errors are distinguished:
//!
//! - [`ValidationError`]: a single value is unusable (wrong state length,
//!   negative rate constant, non-finite dose). Raised by models and by the
//!   parameter constructors.
//! - [`ConfigurationError`]: a run cannot start (malformed time grid, invalid
//!   solver settings, unreadable configuration file). Always detected before
//!   the first derivative evaluation.
//!
//! Numerical failures during integration are NOT errors: they are reported
//! through [`SolverDiagnostic`](crate::solver::SolverDiagnostic) so the caller
//! still receives the partial trajectory.

use thiserror::Error;

/// Invalid model input or parameter value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{model}: state has {found} species, expected {expected}")]
    StateLength {
        model: String,
        expected: usize,
        found: usize,
    },

    #[error("{model}: expected {expected} rate constants, got {found}")]
    RateCount {
        model: String,
        expected: usize,
        found: usize,
    },

    #[error("rate constant #{index} is negative ({value})")]
    NegativeRate { index: usize, value: f64 },

    #[error("rate constant #{index} is not finite ({value})")]
    NonFiniteRate { index: usize, value: f64 },

    #[error("dose #{index} is not finite (onset {onset}, concentration {concentration})")]
    NonFiniteDose {
        index: usize,
        onset: f64,
        concentration: f64,
    },
}

/// A simulation run cannot be configured
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("time grid is empty")]
    EmptyGrid,

    #[error("time grid point #{index} is not finite ({value})")]
    NonFiniteGrid { index: usize, value: f64 },

    #[error("time grid decreases at point #{index}: {previous} -> {value}")]
    NonMonotonicGrid {
        index: usize,
        previous: f64,
        value: f64,
    },

    #[error("initial state component #{index} is not finite ({value})")]
    NonFiniteInitialState { index: usize, value: f64 },

    #[error("invalid grid specification: {0}")]
    GridSpecification(String),

    #[error("invalid solver configuration: {0}")]
    Solver(String),

    #[error("unknown network '{0}'")]
    UnknownNetwork(String),

    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        let err = ValidationError::StateLength {
            model: "Simple chain".to_string(),
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "Simple chain: state has 2 species, expected 3");
    }

    #[test]
    fn test_validation_converts_to_configuration() {
        let err: ConfigurationError = ValidationError::NegativeRate { index: 1, value: -2.0 }.into();
        assert!(matches!(err, ConfigurationError::Validation(_)));
        assert_eq!(err.to_string(), "rate constant #1 is negative (-2)");
    }

    #[test]
    fn test_grid_message() {
        let err = ConfigurationError::NonMonotonicGrid { index: 3, previous: 2.0, value: 1.0 };
        assert!(err.to_string().contains("decreases at point #3"));
    }
}
