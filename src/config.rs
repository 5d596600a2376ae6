//! Simulation configuration
//!
//! A [`SimulationConfig`] describes one run: network, rate constants, initial
//! concentrations, doses, reporting grid and solver settings. It is plain data
//! (serde, JSON on disk). Nothing is validated until [`SimulationConfig::scenario`]
//! or [`SimulationConfig::solver_configuration`] is called; both fail before
//! any derivative is evaluated.
//!
//! ```json
//! {
//!   "network": "forced_branching",
//!   "rates": [45.0, 10.0, 5.0, 0.0],
//!   "initial_state": [0.0, 0.0, 0.0],
//!   "doses": [[-0.001, 1200.0]],
//!   "t_min": 0.0,
//!   "t_max": 320.0,
//!   "points": 321,
//!   "solver": { "rtol": 1e-8, "atol": 1e-10 }
//! }
//! ```
//!
//! Missing fields take the values of [`SimulationConfig::default`].

use crate::error::ConfigurationError;
use crate::models::{build_model, DoseSchedule, NetworkKind};
use crate::physics::RateParameters;
use crate::solver::{
    Dopri5Solver, RK4Solver, Scenario, SimulationResult, Solver, SolverConfiguration, SolverType,
    TimeGrid,
};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::path::Path;

// =================================================================================================
// Solver settings
// =================================================================================================

/// Integration method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    /// Adaptive Dormand-Prince 5(4)
    #[default]
    Dopri5,

    /// Fixed-substep RK4
    Rk4,
}

/// `solver` block of the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSettings {
    pub method: SolverMethod,
    pub rtol: f64,
    pub atol: f64,
    pub max_steps: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_step: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_step: Option<f64>,
    /// RK4 substeps per grid interval
    pub substeps: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            method: SolverMethod::Dopri5,
            rtol: SolverConfiguration::DEFAULT_RTOL,
            atol: SolverConfiguration::DEFAULT_ATOL,
            max_steps: SolverConfiguration::DEFAULT_MAX_STEPS,
            initial_step: None,
            max_step: None,
            substeps: 10,
        }
    }
}

// =================================================================================================
// Simulation configuration
// =================================================================================================

/// Complete description of a run
///
/// # Example
///
/// ```rust
/// use denit_rs::config::SimulationConfig;
///
/// let config = SimulationConfig::from_json_str(r#"{ "rates": [45.0, 12.0] }"#).unwrap();
/// let result = config.run().unwrap();
///
/// assert!(result.success());
/// assert_eq!(result.labels, vec!["NO2", "NO", "N2O"]);
/// assert_eq!(result.trajectory.rows(), 321);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub network: NetworkKind,
    pub rates: RateParameters,
    /// Concentrations at `t_min` \[nM\]
    pub initial_state: Vec<f64>,
    pub doses: DoseSchedule,
    /// \[min\]
    pub t_min: f64,
    /// \[min\]
    pub t_max: f64,
    /// Number of reported time points (evenly spaced, both ends included)
    pub points: usize,
    pub solver: SolverSettings,
}

impl Default for SimulationConfig {
    /// Reference run: simple chain, R = [45, 10], X0 = [1200, 0, 0], 321 points on [0, 320]
    fn default() -> Self {
        Self {
            network: NetworkKind::SimpleChain,
            rates: RateParameters::from_valid(vec![45.0, 10.0]),
            initial_state: vec![1200.0, 0.0, 0.0],
            doses: DoseSchedule::empty(),
            t_min: 0.0,
            t_max: 320.0,
            points: 321,
            solver: SolverSettings::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        log::debug!("loading simulation configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reporting grid
    pub fn time_grid(&self) -> Result<TimeGrid, ConfigurationError> {
        TimeGrid::linspace(self.t_min, self.t_max, self.points)
    }

    /// Build the validated scenario
    ///
    /// # Errors
    ///
    /// Wrong rate count for the network, initial state of the wrong length
    /// or not finite, invalid grid.
    pub fn scenario(&self) -> Result<Scenario, ConfigurationError> {
        let model = build_model(self.network, self.rates.clone(), self.doses.clone())?;
        let grid = self.time_grid()?;
        Scenario::new(model, DVector::from_vec(self.initial_state.clone()), grid)
    }

    /// Build the validated solver configuration
    pub fn solver_configuration(&self) -> Result<SolverConfiguration, ConfigurationError> {
        let settings = &self.solver;
        let solver_type = match settings.method {
            SolverMethod::Dopri5 => SolverType::Adaptive {
                rtol: settings.rtol,
                atol: settings.atol,
                max_steps: settings.max_steps,
                initial_step: settings.initial_step,
                max_step: settings.max_step,
            },
            SolverMethod::Rk4 => SolverType::FixedStep { substeps: settings.substeps },
        };

        let config = SolverConfiguration::new(solver_type);
        config.validate()?;
        Ok(config)
    }

    /// Solver matching `solver.method`
    pub fn solver(&self) -> Box<dyn Solver> {
        match self.solver.method {
            SolverMethod::Dopri5 => Box::new(Dopri5Solver::new()),
            SolverMethod::Rk4 => Box::new(RK4Solver::new()),
        }
    }

    /// Build everything and solve
    pub fn run(&self) -> Result<SimulationResult, ConfigurationError> {
        let scenario = self.scenario()?;
        let config = self.solver_configuration()?;
        self.solver().solve(&scenario, &config)
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use std::io::Write;

    #[test]
    fn test_default_is_reference_run() {
        let config = SimulationConfig::default();
        let scenario = config.scenario().unwrap();

        assert_eq!(scenario.get_model_name(), "Simple chain");
        assert_eq!(scenario.initial.as_slice(), &[1200.0, 0.0, 0.0]);
        assert_eq!(scenario.grid.len(), 321);
        assert_eq!(config.solver_configuration().unwrap(), SolverConfiguration::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json_str(r#"{ "t_max": 10.0, "points": 11 }"#).unwrap();
        assert_eq!(config.network, NetworkKind::SimpleChain);
        assert_eq!(config.rates.as_slice(), &[45.0, 10.0]);
        assert_eq!(config.time_grid().unwrap().end(), 10.0);
    }

    #[test]
    fn test_forced_branching_json() {
        let json = r#"{
            "network": "forced_branching",
            "rates": [45.0, 10.0, 5.0, 0.0],
            "initial_state": [0.0, 0.0, 0.0],
            "doses": [[-0.001, 1200.0]],
            "solver": { "rtol": 1e-8, "atol": 1e-10 }
        }"#;

        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.doses.len(), 1);

        let scenario = config.scenario().unwrap();
        assert_eq!(scenario.labels(), vec!["NOcell", "NOenv", "N2O"]);

        match config.solver_configuration().unwrap().solver_type {
            SolverType::Adaptive { rtol, atol, .. } => {
                assert_eq!(rtol, 1e-8);
                assert_eq!(atol, 1e-10);
            }
            other => panic!("unexpected solver type {:?}", other),
        }
    }

    #[test]
    fn test_rk4_method() {
        let config = SimulationConfig::from_json_str(
            r#"{ "solver": { "method": "rk4", "substeps": 4 } }"#,
        )
        .unwrap();

        assert_eq!(
            config.solver_configuration().unwrap().solver_type,
            SolverType::FixedStep { substeps: 4 }
        );
        assert_eq!(config.solver().name(), "Runge Kutta (RK4)");
    }

    #[test]
    fn test_negative_rate_rejected_at_parse() {
        let err = SimulationConfig::from_json_str(r#"{ "rates": [45.0, -1.0] }"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(SimulationConfig::from_json_str(r#"{ "rate": [1.0] }"#).is_err());
    }

    #[test]
    fn test_rate_count_mismatch() {
        let config = SimulationConfig {
            network: NetworkKind::ForcedBranching,
            ..Default::default()
        };
        assert!(matches!(
            config.scenario(),
            Err(ConfigurationError::Validation(ValidationError::RateCount { .. }))
        ));
    }

    #[test]
    fn test_initial_state_mismatch() {
        let config = SimulationConfig {
            initial_state: vec![1200.0, 0.0],
            ..Default::default()
        };
        assert!(matches!(
            config.scenario(),
            Err(ConfigurationError::Validation(ValidationError::StateLength { .. }))
        ));
    }

    #[test]
    fn test_invalid_grid() {
        let config = SimulationConfig { points: 0, ..Default::default() };
        assert!(matches!(config.scenario(), Err(ConfigurationError::EmptyGrid)));
    }

    #[test]
    fn test_invalid_solver_settings() {
        let mut config = SimulationConfig::default();
        config.solver.max_steps = 0;
        assert!(matches!(config.solver_configuration(), Err(ConfigurationError::Solver(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimulationConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(SimulationConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "points": 5, "t_max": 4.0 }}"#).unwrap();

        let config = SimulationConfig::from_path(file.path()).unwrap();
        assert_eq!(config.points, 5);

        let missing = SimulationConfig::from_path("/nonexistent/denit.json");
        assert!(matches!(missing, Err(ConfigurationError::Io(_))));
    }
}
