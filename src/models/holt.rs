//! Holt's linear trend model (double exponential smoothing).
//!
//! Suitable for data with a trend but no seasonality.

use crate::core::{Forecast, TimeSeries};
use crate::error::{Error, Result};
use crate::models::Forecaster;
use crate::utils::stats::{interval_z, mean_square};

const PARAM_MIN: f64 = 0.0001;
const PARAM_MAX: f64 = 0.9999;

/// Holt's linear trend forecaster.
///
/// The model equations are:
/// - Level: `l_t = α × y_t + (1-α) × (l_{t-1} + b_{t-1})`
/// - Trend: `b_t = β × (l_t - l_{t-1}) + (1-β) × b_{t-1}`
/// - Forecast: `ŷ_{t+h} = l_t + h × b_t`
#[derive(Debug, Clone)]
pub struct HoltLinearTrend {
    /// Level smoothing parameter (0 < α < 1).
    alpha: Option<f64>,
    /// Trend smoothing parameter (0 < β < 1).
    beta: Option<f64>,
    /// Pick alpha and beta from a grid on fit.
    optimize: bool,
    /// Level after the last observation.
    level: Option<f64>,
    /// Trend after the last observation.
    trend: Option<f64>,
    /// One-step-ahead in-sample predictions.
    fitted: Option<Vec<f64>>,
    /// Actual minus fitted.
    residuals: Option<Vec<f64>>,
    /// Mean squared one-step error, used for intervals.
    residual_variance: Option<f64>,
}

/// Smoothed state after a pass over the data.
struct Pass {
    level: f64,
    trend: f64,
    fitted: Vec<f64>,
    /// Sum of squared one-step errors.
    sse: f64,
}

impl HoltLinearTrend {
    /// Create a model with fixed smoothing parameters.
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self {
            alpha: Some(alpha.clamp(PARAM_MIN, PARAM_MAX)),
            beta: Some(beta.clamp(PARAM_MIN, PARAM_MAX)),
            optimize: false,
            level: None,
            trend: None,
            fitted: None,
            residuals: None,
            residual_variance: None,
        }
    }

    /// Create a model whose parameters minimize one-step squared error.
    pub fn auto() -> Self {
        Self {
            alpha: None,
            beta: None,
            optimize: true,
            ..Self::new(0.5, 0.1)
        }
    }

    pub fn alpha(&self) -> Option<f64> {
        self.alpha
    }

    pub fn beta(&self) -> Option<f64> {
        self.beta
    }

    pub fn level(&self) -> Option<f64> {
        self.level
    }

    pub fn trend(&self) -> Option<f64> {
        self.trend
    }

    /// Run the recursions. The first level is the first observation and the
    /// first trend is the first difference.
    fn run(values: &[f64], alpha: f64, beta: f64) -> Pass {
        let mut l = values[0];
        let mut b = values[1] - values[0];
        let mut fitted = Vec::with_capacity(values.len());
        let mut sse = 0.0;

        fitted.push(l);
        for &y in &values[1..] {
            let forecast = l + b;
            fitted.push(forecast);
            sse += (y - forecast).powi(2);

            let l_prev = l;
            l = alpha * y + (1.0 - alpha) * (l_prev + b);
            b = beta * (l - l_prev) + (1.0 - beta) * b;
        }

        Pass {
            level: l,
            trend: b,
            fitted,
            sse,
        }
    }

    /// Coarse grid search over (alpha, beta).
    fn optimize_params(values: &[f64]) -> (f64, f64) {
        let alphas = (1..=19).map(|i| i as f64 * 0.05);
        let mut best = (0.5, 0.1, f64::INFINITY);
        for alpha in alphas {
            for beta in (1..=10).map(|i| i as f64 * 0.05) {
                let sse = Self::run(values, alpha, beta).sse;
                if sse < best.2 {
                    best = (alpha, beta, sse);
                }
            }
        }
        (best.0, best.1)
    }

    fn state(&self) -> Result<(f64, f64)> {
        match (self.level, self.trend) {
            (Some(l), Some(b)) => Ok((l, b)),
            _ => Err(Error::FitRequired),
        }
    }
}

impl Default for HoltLinearTrend {
    fn default() -> Self {
        Self::auto()
    }
}

impl Forecaster for HoltLinearTrend {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        if values.len() < 2 {
            return Err(Error::InsufficientData {
                needed: 2,
                got: values.len(),
            });
        }

        if self.optimize {
            let (alpha, beta) = Self::optimize_params(values);
            self.alpha = Some(alpha);
            self.beta = Some(beta);
        }
        let alpha = self.alpha.ok_or(Error::FitRequired)?;
        let beta = self.beta.ok_or(Error::FitRequired)?;

        let pass = Self::run(values, alpha, beta);
        let residuals: Vec<f64> = values
            .iter()
            .zip(&pass.fitted)
            .map(|(y, f)| y - f)
            .collect();

        self.residual_variance = mean_square(&residuals[1..]);
        self.level = Some(pass.level);
        self.trend = Some(pass.trend);
        self.fitted = Some(pass.fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let (l, b) = self.state()?;
        Ok(Forecast::from_values(
            (1..=horizon).map(|h| l + h as f64 * b).collect(),
        ))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let (l, b) = self.state()?;
        let alpha = self.alpha.ok_or(Error::FitRequired)?;
        let beta = self.beta.ok_or(Error::FitRequired)?;
        let variance = self.residual_variance.unwrap_or(0.0);
        let z = interval_z(level)?;

        let mut point = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        // Variance multiplier: 1 + sum_{j<h} (alpha * (1 + j * beta))^2
        let mut multiplier = 1.0;
        for h in 1..=horizon {
            if h > 1 {
                let j = (h - 1) as f64;
                multiplier += (alpha * (1.0 + j * beta)).powi(2);
            }
            let pred = l + h as f64 * b;
            let se = (variance * multiplier).sqrt();
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
        "HoltLinearTrend"
    }
}
