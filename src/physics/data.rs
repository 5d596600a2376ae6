//! State and trajectory containers
//!
//! - **State**: one concentration per species, in model order (`nalgebra::DVector`)
//! - **Trajectory**: one row per reported time, one column per species
//!   (`ndarray::Array2`), row-major so that each row is a contiguous state
//!
//! # Memory Layout
//!
//! - **State[s]**: 8s bytes
//! - **Trajectory[n×s]**: 8ns bytes

use nalgebra::DVector;
use ndarray::{Array2, ArrayView1, Axis};
use std::fmt;

/// Concentrations of every species at one instant \[nM\]
pub type State = DVector<f64>;

/// Sampled solution of a run
///
/// Row `i` holds the state at `TimeGrid[i]`. Produced by the solvers and
/// immutable once returned.
///
/// # Example
///
/// ```rust
/// use denit_rs::physics::Trajectory;
///
/// let trajectory = Trajectory::filled(3, 2, 0.0);
/// assert_eq!(trajectory.shape(), (3, 2));
/// assert!(trajectory.row(1).iter().all(|&c| c == 0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    data: Array2<f64>,
}

impl Trajectory {

    // ======================================= constructors =======================================

    /// Create a trajectory with every entry set to `value`
    pub fn filled(rows: usize, species: usize, value: f64) -> Self {
        Self { data: Array2::from_elem((rows, species), value) }
    }

    /// Wrap an existing (rows × species) array
    pub fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }

    // ========================================== Queries ==========================================

    /// Number of reported rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of species columns
    pub fn n_species(&self) -> usize {
        self.data.ncols()
    }

    /// (rows, species)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when every entry is finite
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.is_finite())
    }

    // ======================================== Extractions ========================================

    /// State at row `i` (panics when out of range)
    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    /// State at row `i` as an owned vector, if present
    pub fn state(&self, i: usize) -> Option<State> {
        (i < self.rows()).then(|| DVector::from_iterator(self.n_species(), self.data.row(i).iter().copied()))
    }

    /// Time series of species column `j` (panics when out of range)
    pub fn column(&self, j: usize) -> ArrayView1<'_, f64> {
        self.data.column(j)
    }

    /// Last row, if any
    pub fn final_state(&self) -> Option<State> {
        self.rows().checked_sub(1).and_then(|last| self.state(last))
    }

    /// Sum of all species at every row
    ///
    /// For a closed network this is the conserved total nitrogen pool.
    pub fn totals(&self) -> Vec<f64> {
        self.data.sum_axis(Axis(1)).to_vec()
    }

    /// Underlying array
    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    // ======================================= Mutation (crate) ===================================

    pub(crate) fn set_row(&mut self, i: usize, state: &State) {
        for (slot, &value) in self.data.row_mut(i).iter_mut().zip(state.iter()) {
            *slot = value;
        }
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trajectory [{} * {}]", self.rows(), self.n_species())
    }
}

// ==================== Tests ====================
