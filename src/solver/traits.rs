//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! - Central enum `SolverType` defines the kind of time integration
//! - `SolverConfiguration` carries it, with builders for common settings
//! - `SolverDiagnostic` reports how the run went (one per run, not per step)
//! - `SimulationResult` bundles grid, trajectory, diagnostic and labels, which
//!   is everything a reporter needs
//!
//! Configuration problems are errors (`ConfigurationError`); numerical
//! trouble during the run is NOT: it is carried by `SolverStatus` so the
//! caller still gets the rows computed before the failure.

use crate::error::ConfigurationError;
use crate::physics::{State, Trajectory};
use crate::solver::Scenario;
use ndarray::ArrayView1;
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Central Solver Type Enumeration
// ============================================================================

/// Kind of time integration
///
/// # Examples
///
/// ```rust
/// use denit_rs::solver::SolverType;
///
/// // Error-controlled integration
/// let adaptive = SolverType::Adaptive {
///     rtol: 1e-6,
///     atol: 1e-9,
///     max_steps: 100_000,
///     initial_step: None,
///     max_step: None,
/// };
/// assert!(adaptive.validate().is_ok());
///
/// // Fixed number of RK4 substeps per reporting interval
/// let fixed = SolverType::FixedStep { substeps: 10 };
/// assert_eq!(fixed.name(), "FixedStep");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SolverType {

    /// Adaptive step size with local error control
    ///
    /// Used by: Dormand-Prince 5(4)
    ///
    /// # Parameters
    /// - `rtol`, `atol`: relative and absolute tolerances
    /// - `max_steps`: budget of attempted steps (accepted + rejected)
    /// - `initial_step`: first trial step (estimated when `None`)
    /// - `max_step`: upper bound on the internal step (grid span when `None`)
    Adaptive {
        rtol: f64,
        atol: f64,
        max_steps: usize,
        initial_step: Option<f64>,
        max_step: Option<f64>,
    },

    /// Fixed substeps between consecutive grid points
    ///
    /// Used by: classical RK4
    FixedStep {
        substeps: usize,
    },
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &str {
        match self {
            SolverType::Adaptive { .. } => "Adaptive",
            SolverType::FixedStep { .. } => "FixedStep",
        }
    }

    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match self {
            SolverType::Adaptive { rtol, atol, max_steps, initial_step, max_step } => {
                if !rtol.is_finite() || *rtol < 0.0 || !atol.is_finite() || *atol < 0.0 {
                    return Err(ConfigurationError::Solver(format!(
                        "tolerances must be finite and non-negative (rtol {rtol}, atol {atol})"
                    )));
                }
                if *rtol == 0.0 && *atol == 0.0 {
                    return Err(ConfigurationError::Solver(
                        "rtol and atol cannot both be zero".to_string(),
                    ));
                }
                if *max_steps == 0 {
                    return Err(ConfigurationError::Solver(
                        "max_steps must be greater than 0".to_string(),
                    ));
                }
                for (label, value) in [("initial_step", initial_step), ("max_step", max_step)] {
                    match value {
                        Some(step) if !step.is_finite() || *step <= 0.0 => {
                            return Err(ConfigurationError::Solver(format!(
                                "{label} must be positive, got {step}"
                            )));
                        }
                        _ => {}
                    }
                }
                Ok(())
            }
            SolverType::FixedStep { substeps } => {
                if *substeps == 0 {
                    return Err(ConfigurationError::Solver(
                        "substeps must be greater than 0".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration for a numerical solver
///
/// # Examples
///
/// ```rust
/// use denit_rs::solver::SolverConfiguration;
///
/// let config = SolverConfiguration::adaptive(1e-8, 1e-10).with_max_steps(5_000);
/// assert!(config.validate().is_ok());
///
/// let fixed = SolverConfiguration::fixed_step(20);
/// assert!(fixed.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfiguration {
    /// Type of solver and its parameters
    pub solver_type: SolverType,
}

impl SolverConfiguration {
    /// Default relative tolerance
    pub const DEFAULT_RTOL: f64 = 1e-6;
    /// Default absolute tolerance \[nM\]
    pub const DEFAULT_ATOL: f64 = 1e-9;
    /// Default budget of attempted steps
    pub const DEFAULT_MAX_STEPS: usize = 100_000;

    /// Create a new configuration with a given solver type
    pub fn new(solver_type: SolverType) -> Self {
        Self { solver_type }
    }

    /// Create an adaptive configuration
    pub fn adaptive(rtol: f64, atol: f64) -> Self {
        Self::new(SolverType::Adaptive {
            rtol,
            atol,
            max_steps: Self::DEFAULT_MAX_STEPS,
            initial_step: None,
            max_step: None,
        })
    }

    /// Create a fixed-step configuration
    pub fn fixed_step(substeps: usize) -> Self {
        Self::new(SolverType::FixedStep { substeps })
    }

    /// Builder pattern: set the step budget (adaptive only)
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        if let SolverType::Adaptive { max_steps, .. } = &mut self.solver_type {
            *max_steps = steps;
        }
        self
    }

    /// Builder pattern: set the first trial step (adaptive only)
    pub fn with_initial_step(mut self, step: f64) -> Self {
        if let SolverType::Adaptive { initial_step, .. } = &mut self.solver_type {
            *initial_step = Some(step);
        }
        self
    }

    /// Builder pattern: bound the internal step (adaptive only)
    pub fn with_max_step(mut self, step: f64) -> Self {
        if let SolverType::Adaptive { max_step, .. } = &mut self.solver_type {
            *max_step = Some(step);
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.solver_type.validate()
    }
}

impl Default for SolverConfiguration {
    fn default() -> Self {
        Self::adaptive(Self::DEFAULT_RTOL, Self::DEFAULT_ATOL)
    }
}

// =================================================================================================
// Diagnostics
// =================================================================================================

/// Outcome of an integration run
#[derive(Clone, Debug, PartialEq)]
pub enum SolverStatus {
    /// Every grid point reached within tolerance
    Success,

    /// The step needed to meet the tolerance fell below the resolvable minimum
    StepSizeUnderflow { t: f64, step: f64 },

    /// A derivative or state became NaN/Inf
    NonFiniteState { t: f64 },

    /// The step budget ran out before the last grid point
    MaxStepsExceeded { t: f64, steps: usize },

    /// The model rejected an evaluation
    ModelFailure { t: f64, message: String },
}

impl SolverStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, SolverStatus::Success)
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverStatus::Success => write!(f, "integration successful"),
            SolverStatus::StepSizeUnderflow { t, step } => {
                write!(f, "step size {step:e} underflow at t = {t}")
            }
            SolverStatus::NonFiniteState { t } => {
                write!(f, "non-finite state or derivative at t = {t}")
            }
            SolverStatus::MaxStepsExceeded { t, steps } => {
                write!(f, "step budget of {steps} exhausted at t = {t}")
            }
            SolverStatus::ModelFailure { t, message } => {
                write!(f, "model evaluation failed at t = {t}: {message}")
            }
        }
    }
}

/// Per-run solver report
///
/// `completed_rows` counts the trajectory rows obtained by integration
/// (row 0 included). On failure, the row where a non-finite value appeared
/// holds that value and the rows after it are NaN.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverDiagnostic {
    pub status: SolverStatus,
    pub evaluations: usize,
    pub accepted_steps: usize,
    pub rejected_steps: usize,
    pub completed_rows: usize,
}

impl SolverDiagnostic {
    /// True when the run reached every grid point
    pub fn success(&self) -> bool {
        self.status.is_success()
    }

    /// Human readable status
    pub fn message(&self) -> String {
        self.status.to_string()
    }
}

impl fmt::Display for SolverDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} evaluations, {} accepted / {} rejected steps)",
            self.status, self.evaluations, self.accepted_steps, self.rejected_steps
        )
    }
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Everything produced by one run
///
/// Holds the data handed to a reporter: the time grid, the trajectory, the
/// diagnostic and the species labels in state order.
#[derive(Clone, Debug)]
pub struct SimulationResult {
    pub time_points: Vec<f64>,
    pub trajectory: Trajectory,
    pub diagnostic: SolverDiagnostic,
    pub labels: Vec<String>,
    metadata: HashMap<String, String>,
}

impl SimulationResult {
    pub fn new(
        time_points: Vec<f64>,
        trajectory: Trajectory,
        diagnostic: SolverDiagnostic,
        labels: Vec<String>,
    ) -> Self {
        Self {
            time_points,
            trajectory,
            diagnostic,
            labels,
            metadata: HashMap::new(),
        }
    }

    /// Number of reported rows
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    /// True when the solver reached every grid point
    pub fn success(&self) -> bool {
        self.diagnostic.success()
    }

    /// State at the last grid point
    pub fn final_state(&self) -> Option<State> {
        self.trajectory.final_state()
    }

    /// Column index of a species label
    pub fn species_index(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Time series of the species named `label`
    pub fn series(&self, label: &str) -> Option<ArrayView1<'_, f64>> {
        self.species_index(label).map(|j| self.trajectory.column(j))
    }

    /// Attach a metadata entry (solver name, tolerances, ...)
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Metadata entries sorted by key
    pub fn metadata(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .metadata
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort();
        entries
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// Numerical time integrator
///
/// # Contract
///
/// - `result.trajectory.rows() == scenario.grid.len()`
/// - Row 0 is the scenario's initial state, bit for bit
/// - Identical inputs give identical outputs
/// - Configuration errors are returned before any derivative evaluation;
///   numerical failures are reported in `result.diagnostic`
pub trait Solver: Send + Sync {
    fn solve(
        &self,
        scenario: &Scenario,
        config: &SolverConfiguration,
    ) -> Result<SimulationResult, ConfigurationError>;

    fn name(&self) -> &'static str;
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_default_configuration() {
        let config = SolverConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.solver_type.name(), "Adaptive");
    }

    #[test]
    fn test_builders() {
        let config = SolverConfiguration::adaptive(1e-6, 1e-9)
            .with_max_steps(10)
            .with_initial_step(0.5)
            .with_max_step(2.0);

        assert_eq!(
            config.solver_type,
            SolverType::Adaptive {
                rtol: 1e-6,
                atol: 1e-9,
                max_steps: 10,
                initial_step: Some(0.5),
                max_step: Some(2.0),
            }
        );

        // Adaptive-only builders leave a fixed-step configuration untouched
        let fixed = SolverConfiguration::fixed_step(4).with_max_steps(10);
        assert_eq!(fixed.solver_type, SolverType::FixedStep { substeps: 4 });
    }

    #[test]
    fn test_invalid_tolerances() {
        assert!(SolverConfiguration::adaptive(-1.0, 1e-9).validate().is_err());
        assert!(SolverConfiguration::adaptive(1e-6, f64::NAN).validate().is_err());
        assert!(SolverConfiguration::adaptive(0.0, 0.0).validate().is_err());
        assert!(SolverConfiguration::adaptive(0.0, 1e-9).validate().is_ok());
    }

    #[test]
    fn test_invalid_steps() {
        assert!(SolverConfiguration::default().with_max_steps(0).validate().is_err());
        assert!(SolverConfiguration::default().with_initial_step(0.0).validate().is_err());
        assert!(SolverConfiguration::default().with_max_step(-1.0).validate().is_err());
        assert!(SolverConfiguration::fixed_step(0).validate().is_err());
    }

    #[test]
    fn test_status_display() {
        assert!(SolverStatus::Success.is_success());
        let status = SolverStatus::MaxStepsExceeded { t: 12.5, steps: 10 };
        assert!(!status.is_success());
        assert_eq!(status.to_string(), "step budget of 10 exhausted at t = 12.5");
    }

    #[test]
    fn test_result_series_and_metadata() {
        let diagnostic = SolverDiagnostic {
            status: SolverStatus::Success,
            evaluations: 7,
            accepted_steps: 1,
            rejected_steps: 0,
            completed_rows: 2,
        };
        let mut result = SimulationResult::new(
            vec![0.0, 1.0],
            Trajectory::from_array(array![[1.0, 0.0], [0.5, 0.5]]),
            diagnostic,
            vec!["NO".to_string(), "N2O".to_string()],
        );
        result.add_metadata("solver", "test");
        result.add_metadata("rtol", "1e-6");

        assert_eq!(result.len(), 2);
        assert!(result.success());
        assert_eq!(result.series("N2O").unwrap().to_vec(), vec![0.0, 0.5]);
        assert!(result.series("NO2").is_none());
        assert_eq!(result.get_metadata("solver"), Some("test"));
        assert_eq!(result.metadata(), vec![("rtol", "1e-6"), ("solver", "test")]);
    }
}
