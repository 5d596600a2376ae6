//! Reporting time grid
//!
//! # Design
//!
//! The grid only decides WHERE the solution is reported. The adaptive solver
//! picks its own internal steps and interpolates onto these points, so a
//! coarse grid does not mean a coarse integration.
//!
//! # Invariants
//!
//! - At least one point
//! - Every point finite
//! - Non-decreasing (repeated times are allowed and reported identically)

use crate::error::ConfigurationError;
use std::ops::Index;

/// Ordered reporting times \[min\]
///
/// # Examples
///
/// ```rust
/// use denit_rs::solver::TimeGrid;
///
/// let grid = TimeGrid::linspace(0.0, 320.0, 321).unwrap();
/// assert_eq!(grid.len(), 321);
/// assert_eq!(grid.start(), 0.0);
/// assert_eq!(grid.end(), 320.0);
///
/// assert!(TimeGrid::new(vec![0.0, 2.0, 1.0]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    points: Vec<f64>,
}

impl TimeGrid {
    /// Validate an explicit list of times
    pub fn new(points: Vec<f64>) -> Result<Self, ConfigurationError> {
        if points.is_empty() {
            return Err(ConfigurationError::EmptyGrid);
        }

        for (index, &value) in points.iter().enumerate() {
            if !value.is_finite() {
                return Err(ConfigurationError::NonFiniteGrid { index, value });
            }
            if index > 0 && value < points[index - 1] {
                return Err(ConfigurationError::NonMonotonicGrid {
                    index,
                    previous: points[index - 1],
                    value,
                });
            }
        }

        Ok(Self { points })
    }

    /// `count` evenly spaced points from `start` to `end` inclusive
    ///
    /// A single point yields `[start]`. Points are computed from their index
    /// (not by accumulating a step) so that the last one is exactly `end`.
    pub fn linspace(start: f64, end: f64, count: usize) -> Result<Self, ConfigurationError> {
        if count == 0 {
            return Err(ConfigurationError::EmptyGrid);
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(ConfigurationError::GridSpecification(format!(
                "bounds must be finite, got [{start}, {end}]"
            )));
        }
        if end < start {
            return Err(ConfigurationError::GridSpecification(format!(
                "end {end} precedes start {start}"
            )));
        }

        if count == 1 {
            return Self::new(vec![start]);
        }

        let span = end - start;
        let last = (count - 1) as f64;
        let points = (0..count)
            .map(|i| if i + 1 == count { end } else { start + span * (i as f64) / last })
            .collect();

        Self::new(points)
    }

    /// Points from `start` to `end` with spacing `step` (end included when reached)
    pub fn with_step(start: f64, end: f64, step: f64) -> Result<Self, ConfigurationError> {
        if step <= 0.0 || !step.is_finite() {
            return Err(ConfigurationError::GridSpecification(format!(
                "step must be positive and finite, got {step}"
            )));
        }
        if !start.is_finite() || !end.is_finite() || end < start {
            return Err(ConfigurationError::GridSpecification(format!(
                "invalid bounds [{start}, {end}]"
            )));
        }

        // Tolerate rounding in (end - start) / step
        let intervals = ((end - start) / step + 1e-9).floor() as usize;
        Self::new((0..=intervals).map(|i| start + step * i as f64).collect())
    }

    // ===================================== Query methods =========================================

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a grid holds at least its start time
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Simulation start time
    pub fn start(&self) -> f64 {
        self.points[0]
    }

    /// Last reported time
    pub fn end(&self) -> f64 {
        self.points[self.points.len() - 1]
    }

    /// Covered duration
    pub fn span(&self) -> f64 {
        self.end() - self.start()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.points.iter()
    }
}

impl Index<usize> for TimeGrid {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.points[index]
    }
}

// =================================================================================================
// Tests
// =================================================================================================
