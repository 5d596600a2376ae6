//! Output module for simulation results
//!
//! Reporters receive a complete [`SimulationResult`](crate::solver::SimulationResult)
//! (time grid, trajectory, diagnostic, species labels) and deliver it
//! somewhere. The solver never writes output itself.
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! └── export/             ← Data export
//!     ├── mod.rs          ← TrajectoryReporter trait, ExportError
//!     └── csv.rs          ← CsvReporter
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use denit_rs::config::SimulationConfig;
//! use denit_rs::output::{CsvReporter, TrajectoryReporter};
//!
//! let result = SimulationConfig::default().run().unwrap();
//! let file = tempfile::NamedTempFile::new().unwrap();
//!
//! CsvReporter::new(file.path()).report(&result).unwrap();
//! ```

pub mod export;

// Re-export commonly used items for convenience
pub use export::{CsvConfig, CsvReporter, ExportError, TrajectoryReporter};
