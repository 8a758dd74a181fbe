//! Utility functions.

pub mod stats;

pub use stats::quantile_normal;
