//! Forecaster trait: the boundary to the forecasting model.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::core::{Forecast, TimeSeries};
use crate::error::{Error, Result};
use crate::models::{HoltLinearTrend, RandomWalkWithDrift};

/// Common interface for forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate point predictions for the next `horizon` steps.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with a central interval at `level`.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// In-sample predictions, one per observation. May hold NaN where the
    /// model has no estimate.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use quickcast::models::{BoxedForecaster, ModelKind};
///
/// let model: BoxedForecaster = ModelKind::Drift.create();
/// assert_eq!(model.name(), "RandomWalkWithDrift");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;

/// Bundled models selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Drift,
    #[default]
    Holt,
}

impl ModelKind {
    /// Create a fresh, unfitted instance.
    pub fn create(&self) -> BoxedForecaster {
        match self {
            ModelKind::Drift => Box::new(RandomWalkWithDrift::new()),
            ModelKind::Holt => Box::new(HoltLinearTrend::auto()),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Drift => f.write_str("drift"),
            ModelKind::Holt => f.write_str("holt"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drift" | "rwd" => Ok(ModelKind::Drift),
            "holt" => Ok(ModelKind::Holt),
            other => Err(Error::InvalidParameter(format!(
                "unknown model '{other}', expected 'drift' or 'holt'"
            ))),
        }
    }
}
