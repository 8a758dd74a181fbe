//! Univariate time series of finite observations.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};

/// An ordered series of `(timestamp, value)` pairs.
///
/// Timestamps are strictly increasing and every value is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
}

impl TimeSeries {
    /// Create a series, validating ordering and finiteness.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(Error::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(Error::Timestamp(
                "timestamps must be strictly increasing".to_string(),
            ));
        }

        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "non-finite value at position {pos}"
            )));
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
        })
    }

    /// Attach a label, typically the source column name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Timestamp of the last observation.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Gaps between consecutive timestamps.
    pub fn gaps(&self) -> impl Iterator<Item = Duration> + '_ {
        self.timestamps.windows(2).map(|w| w[1] - w[0])
    }

    /// Iterate over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}
