//! CSV export of simulation results
//!
//! Output is compatible with spreadsheets, pandas and most analysis tools.
//!
//! # Features
//!
//! - **Metadata header**: `#` comment lines with model, solver, status, timestamp
//! - **Customizable**: delimiter, decimal separator, precision
//! - **Downsampling**: uniform subset of rows, first and last always kept
//! - **Failed runs**: NaN rows are written as `NaN`, never dropped
//!
//! # Output
//!
//! ```csv
//! # Denitrification Simulation Data
//! # Generated: 2026-10-18T09:30:00+00:00
//! # Model: Simple chain
//! # Solver: Dormand-Prince 5(4)
//! # Status: integration successful
//! # atol: 0.000000001
//! # rtol: 0.000001
//! #
//! time,NO2,NO,N2O
//! 0,1200,0,0
//! 1,1155,35,10
//! ...
//! ```

use crate::output::export::{check_result, ExportError, TrajectoryReporter};
use crate::solver::SimulationResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Example
///
/// ```rust
/// use denit_rs::output::export::CsvConfig;
///
/// let config = CsvConfig {
///     delimiter: ';',
///     precision: Some(10),
///     ..Default::default()
/// };
/// assert!(config.include_metadata);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Fixed decimal places; `None` writes the shortest exact representation
    pub precision: Option<usize>,

    /// Include metadata header comments (default: true)
    pub include_metadata: bool,

    /// Header of the time column (default: "time")
    pub time_header: String,

    /// Number of rows to keep; `None` keeps every grid point
    pub n_points: Option<usize>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: None,
            include_metadata: true,
            time_header: "time".to_string(),
            n_points: None,
        }
    }
}

impl CsvConfig {
    /// European CSV format (semicolon, comma for decimal)
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Builder pattern: drop the comment header
    pub fn without_metadata(mut self) -> Self {
        self.include_metadata = false;
        self
    }

    /// Builder pattern: keep `n_points` rows
    pub fn downsample(mut self, n_points: usize) -> Self {
        self.n_points = Some(n_points);
        self
    }
}

// =============================================================================
// Reporter
// =============================================================================

/// Writes a [`SimulationResult`] to a CSV file
#[derive(Debug, Clone)]
pub struct CsvReporter {
    path: PathBuf,
    config: CsvConfig,
}

impl CsvReporter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            config: CsvConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// Write the CSV document to any writer
    pub fn write_to<W: Write>(&self, result: &SimulationResult, writer: &mut W) -> Result<(), ExportError> {
        check_result(result)?;
        let config = &self.config;

        // ============================= Write Metadata =========================

        if config.include_metadata {
            write_metadata_header(writer, result)?;
        }

        // ============================= Write Header ===========================

        write!(writer, "{}", config.time_header)?;
        for label in &result.labels {
            write!(writer, "{}{}", config.delimiter, label)?;
        }
        writeln!(writer)?;

        // ============================= Write Data =============================

        for i in downsample_indices(result.len(), config.n_points) {
            write!(writer, "{}", format_number(result.time_points[i], config))?;
            for value in result.trajectory.row(i).iter() {
                write!(writer, "{}{}", config.delimiter, format_number(*value, config))?;
            }
            writeln!(writer)?;
        }

        Ok(())
    }
}

impl TrajectoryReporter for CsvReporter {
    type Error = ExportError;

    fn report(&self, result: &SimulationResult) -> Result<(), ExportError> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        self.write_to(result, &mut writer)?;
        writer.flush()?;

        log::debug!(
            "wrote {} rows to {}",
            downsample_indices(result.len(), self.config.n_points).len(),
            self.path.display()
        );
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Write metadata header comments
fn write_metadata_header<W: Write>(writer: &mut W, result: &SimulationResult) -> std::io::Result<()> {
    writeln!(writer, "# Denitrification Simulation Data")?;

    let now = chrono::Utc::now();
    writeln!(writer, "# Generated: {}", now.to_rfc3339())?;

    if let Some(model) = result.get_metadata("model") {
        writeln!(writer, "# Model: {}", model)?;
    }
    if let Some(solver) = result.get_metadata("solver") {
        writeln!(writer, "# Solver: {}", solver)?;
    }
    writeln!(writer, "# Status: {}", result.diagnostic.message())?;

    for (key, value) in result.metadata() {
        if key != "model" && key != "solver" {
            writeln!(writer, "# {}: {}", key, value)?;
        }
    }

    writeln!(writer, "#")
}

/// Format number with configured precision and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = match config.precision {
        Some(prec) => format!("{:.prec$}", value, prec = prec),
        None => format!("{}", value),
    };

    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

/// Rows kept when reducing `len` rows to about `n_points`
///
/// Uniform in index space; the first and last rows are always included.
fn downsample_indices(len: usize, n_points: Option<usize>) -> Vec<usize> {
    match n_points {
        Some(n) if n < len && len > 1 => {
            let n = n.max(2);
            let mut indices: Vec<usize> = (0..n)
                .map(|k| ((k * (len - 1)) as f64 / (n - 1) as f64).round() as usize)
                .collect();
            indices.dedup();
            indices
        }
        _ => (0..len).collect(),
    }
}

// =================================================================================================
// Tests
// =================================================================================================
