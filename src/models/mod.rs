//! Reaction networks for denitrification simulation
//!
//! All models implement the [`ReactionModel`](crate::physics::ReactionModel) trait.
//! The solver calls `derivative` at every stage of every step: models are
//! responsible for the kinetics, the solver for the time integration.
//!
//! # Available Models
//!
//! ## [`SimpleChain`]: NO2 → NO → N2O
//!
//! Three tracked species, constant step rates `[k1, k2]`. The nitrite pool is
//! a state variable drained at a constant rate.
//!
//! ## [`ForcedBranching`]: dosed NO2, cell/environment NO exchange
//!
//! Three tracked species `[NOcell, NOenv, N2O]`, rates
//! `[k_nitrite, k_in, k_out, k_no]`. Nitrite enters through a
//! [`DoseForcing`] profile instead of a state variable.
//!
//! # Selecting a Network
//!
//! The topology is chosen explicitly through [`NetworkKind`]; there is no
//! implicit "latest definition" lookup.
//!
//! ```rust
//! use denit_rs::models::{build_model, DoseSchedule, NetworkKind};
//! use denit_rs::physics::{RateParameters, ReactionModel};
//!
//! let model = build_model(
//!     NetworkKind::SimpleChain,
//!     RateParameters::new(vec![45.0, 10.0]).unwrap(),
//!     DoseSchedule::empty(),
//! ).unwrap();
//! assert_eq!(model.name(), "Simple chain");
//! ```

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod dosing;
pub mod simple_chain;
pub mod forced_branching;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use dosing::{DoseEvent, DoseForcing, DoseSchedule};
pub use simple_chain::SimpleChain;
pub use forced_branching::ForcedBranching;

use crate::error::{ConfigurationError, ValidationError};
use crate::physics::{RateParameters, ReactionModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network topology selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    /// [`SimpleChain`]
    #[default]
    SimpleChain,

    /// [`ForcedBranching`]
    ForcedBranching,
}

impl NetworkKind {
    /// Identifier used in configuration files
    pub fn name(&self) -> &'static str {
        match self {
            NetworkKind::SimpleChain => "simple_chain",
            NetworkKind::ForcedBranching => "forced_branching",
        }
    }

    /// Number of rate constants the network expects
    pub fn rate_count(&self) -> usize {
        match self {
            NetworkKind::SimpleChain => SimpleChain::RATE_COUNT,
            NetworkKind::ForcedBranching => ForcedBranching::RATE_COUNT,
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NetworkKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "simple_chain" | "simple" => Ok(NetworkKind::SimpleChain),
            "forced_branching" | "branching" => Ok(NetworkKind::ForcedBranching),
            _ => Err(ConfigurationError::UnknownNetwork(s.to_string())),
        }
    }
}

/// Build the selected network
///
/// The dose schedule is only used by [`ForcedBranching`]; a simple chain
/// ignores it (with a warning when it is not empty).
pub fn build_model(
    kind: NetworkKind,
    rates: RateParameters,
    doses: DoseSchedule,
) -> Result<Box<dyn ReactionModel>, ValidationError> {
    match kind {
        NetworkKind::SimpleChain => {
            if !doses.is_empty() {
                log::warn!(
                    "simple chain ignores the dose schedule ({} events)",
                    doses.len()
                );
            }
            Ok(Box::new(SimpleChain::new(rates)?))
        }
        NetworkKind::ForcedBranching => Ok(Box::new(ForcedBranching::new(rates, doses)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_str() {
        assert_eq!("simple_chain".parse::<NetworkKind>().unwrap(), NetworkKind::SimpleChain);
        assert_eq!("Forced-Branching".parse::<NetworkKind>().unwrap(), NetworkKind::ForcedBranching);
        assert!(matches!(
            "michaelis_menten".parse::<NetworkKind>(),
            Err(ConfigurationError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_network_serde_names() {
        let kind: NetworkKind = serde_json::from_str("\"forced_branching\"").unwrap();
        assert_eq!(kind, NetworkKind::ForcedBranching);
        assert_eq!(serde_json::to_string(&NetworkKind::SimpleChain).unwrap(), "\"simple_chain\"");
    }

    #[test]
    fn test_build_each_network() {
        let chain = build_model(
            NetworkKind::SimpleChain,
            RateParameters::new(vec![45.0, 10.0]).unwrap(),
            DoseSchedule::empty(),
        )
        .unwrap();
        assert_eq!(chain.labels(), vec!["NO2", "NO", "N2O"]);

        let branching = build_model(
            NetworkKind::ForcedBranching,
            RateParameters::new(vec![45.0, 10.0, 5.0, 0.0]).unwrap(),
            DoseSchedule::from_pairs(&[(-0.001, 1200.0)]).unwrap(),
        )
        .unwrap();
        assert_eq!(branching.labels(), vec!["NOcell", "NOenv", "N2O"]);
    }

    #[test]
    fn test_build_rejects_rate_mismatch() {
        let result = build_model(
            NetworkKind::ForcedBranching,
            RateParameters::new(vec![45.0, 10.0]).unwrap(),
            DoseSchedule::empty(),
        );
        assert!(result.is_err());
        assert_eq!(NetworkKind::ForcedBranching.rate_count(), 4);
    }
}
