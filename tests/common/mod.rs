//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{ConstantGrowth, ExponentialDecay, FailsAfter};
pub use test_helpers::{
    assert_rows_close,
    chain_scenario,
    compute_l2_error,
    reference_grid,
    relative_error,
};
