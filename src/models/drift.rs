//! Random walk with drift.
//!
//! Forecasts the last value plus a drift term estimated from the history.

use crate::core::{Forecast, TimeSeries};
use crate::error::{Error, Result};
use crate::models::Forecaster;
use crate::utils::stats::{interval_z, mean_square};

/// Random walk with drift forecaster.
///
/// The forecast is `y_hat[t+h] = y[t] + h * drift`, where drift is the
/// average change over the series.
#[derive(Debug, Clone, Default)]
pub struct RandomWalkWithDrift {
    /// Last observed value, the forecast origin.
    last_value: Option<f64>,
    /// Average change per step.
    drift: Option<f64>,
    /// In-sample predictions. The first is NaN.
    fitted: Option<Vec<f64>>,
    /// Actual minus fitted.
    residuals: Option<Vec<f64>>,
    /// Mean squared one-step residual.
    residual_variance: Option<f64>,
}

impl RandomWalkWithDrift {
    pub fn new() -> Self {
        Self::default()
    }

    /// Estimated drift per step.
    pub fn drift(&self) -> Option<f64> {
        self.drift
    }

    fn state(&self) -> Result<(f64, f64)> {
        match (self.last_value, self.drift) {
            (Some(last), Some(drift)) => Ok((last, drift)),
            _ => Err(Error::FitRequired),
        }
    }
}

impl Forecaster for RandomWalkWithDrift {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        let n = values.len();
        if n < 2 {
            return Err(Error::InsufficientData { needed: 2, got: n });
        }

        let drift = (values[n - 1] - values[0]) / (n - 1) as f64;

        // No prediction exists for the first observation.
        let mut fitted = Vec::with_capacity(n);
        let mut residuals = Vec::with_capacity(n);
        fitted.push(f64::NAN);
        residuals.push(f64::NAN);
        for w in values.windows(2) {
            let pred = w[0] + drift;
            fitted.push(pred);
            residuals.push(w[1] - pred);
        }

        self.residual_variance = mean_square(&residuals[1..]);
        self.last_value = Some(values[n - 1]);
        self.drift = Some(drift);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let (last, drift) = self.state()?;
        Ok(Forecast::from_values(
            (1..=horizon).map(|h| last + h as f64 * drift).collect(),
        ))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let (last, drift) = self.state()?;
        let z = interval_z(level)?;
        let sigma = self.residual_variance.unwrap_or(0.0).sqrt();

        let mut point = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            let pred = last + h as f64 * drift;
            let se = sigma * (h as f64).sqrt();
            point.push(pred);
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

        Forecast::from_values_with_intervals(point, lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "RandomWalkWithDrift"
    }
}
