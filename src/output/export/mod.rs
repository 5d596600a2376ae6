//! Export module for simulation results.
//!
//! # Architecture
//!
//! This module defines the [`TrajectoryReporter`] trait that abstracts the
//! destination of a run. Each format is an independent implementation in its
//! own sub-module; adding a format means adding a file.
//!
//! # Available formats
//!
//! | Format  | Module  |
//! |---------|---------|
//! | CSV     | [`csv`] |
//!
//! # Usage example
//!
//! ```rust
//! use denit_rs::config::SimulationConfig;
//! use denit_rs::output::export::{CsvConfig, CsvReporter, TrajectoryReporter};
//!
//! let result = SimulationConfig::default().run().unwrap();
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("chain.csv");
//!
//! // Every 10th minute, first and last rows always included
//! CsvReporter::new(&path)
//!     .with_config(CsvConfig::default().downsample(33))
//!     .report(&result)
//!     .unwrap();
//! ```

pub mod csv;

pub use csv::{CsvConfig, CsvReporter};

use crate::solver::SimulationResult;
use thiserror::Error;

/// Reporting failure
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("cannot write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("nothing to report: result has no rows")]
    Empty,

    #[error("result has {times} time points but {rows} trajectory rows")]
    RowMismatch { times: usize, rows: usize },

    #[error("result has {labels} species labels but {columns} trajectory columns")]
    LabelMismatch { labels: usize, columns: usize },
}

/// Destination of a simulation result
///
/// # Associated type `Error`
///
/// Each reporter manages its own errors via the associated type, so the
/// caller can react to the precise failure without boxing.
pub trait TrajectoryReporter {
    /// Error type specific to this reporter
    type Error: std::error::Error;

    /// Deliver one result (grid, trajectory, diagnostic, labels)
    fn report(&self, result: &SimulationResult) -> Result<(), Self::Error>;
}

/// Shape checks shared by reporters
pub(crate) fn check_result(result: &SimulationResult) -> Result<(), ExportError> {
    if result.is_empty() {
        return Err(ExportError::Empty);
    }

    let (rows, columns) = result.trajectory.shape();
    if rows != result.time_points.len() {
        return Err(ExportError::RowMismatch { times: result.time_points.len(), rows });
    }
    if columns != result.labels.len() {
        return Err(ExportError::LabelMismatch { labels: result.labels.len(), columns });
    }

    Ok(())
}
