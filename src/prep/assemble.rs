//! Merge actuals, in-sample fits and forecasts into one ordered table.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{Forecast, TimeSeries};
use crate::error::{Error, Result};

/// One row of the display/export table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    pub timestamp: DateTime<Utc>,
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub is_historical: bool,
    pub fitted_value: Option<f64>,
}

impl ForecastRow {
    fn actual(timestamp: DateTime<Utc>, value: f64, fitted: Option<f64>) -> Self {
        Self {
            timestamp,
            point_estimate: value,
            lower_bound: value,
            upper_bound: value,
            is_historical: true,
            fitted_value: fitted.filter(|f| f.is_finite()),
        }
    }
}

/// Assemble historical rows followed by forecast rows.
///
/// `fitted` must hold one value per observation; non-finite entries mean the
/// model had no estimate. `forecast` pairs the window timestamps with the
/// model output for them. Without model intervals the bounds equal the point.
pub fn assemble(
    series: &TimeSeries,
    fitted: Option<&[f64]>,
    forecast: Option<(&[DateTime<Utc>], &Forecast)>,
) -> Result<Vec<ForecastRow>> {
    if let Some(fitted) = fitted {
        if fitted.len() != series.len() {
            return Err(Error::DimensionMismatch {
                expected: series.len(),
                got: fitted.len(),
            });
        }
    }

    let extra = forecast.map_or(0, |(window, _)| window.len());
    let mut rows = Vec::with_capacity(series.len() + extra);
    for (i, (timestamp, value)) in series.iter().enumerate() {
        rows.push(ForecastRow::actual(
            timestamp,
            value,
            fitted.map(|f| f[i]),
        ));
    }

    let Some((window, forecast)) = forecast else {
        return Ok(rows);
    };

    if forecast.horizon() != window.len() {
        return Err(Error::DimensionMismatch {
            expected: window.len(),
            got: forecast.horizon(),
        });
    }
    if let (Some(last), Some(first)) = (series.last_timestamp(), window.first()) {
        if *first <= last {
            return Err(Error::Timestamp(
                "forecast must start after the last observation".to_string(),
            ));
        }
    }
    if window.windows(2).any(|w| w[1] <= w[0]) {
        return Err(Error::Timestamp(
            "forecast timestamps must be strictly increasing".to_string(),
        ));
    }

    let point = forecast.point();
    let (lower, upper) = match (forecast.lower(), forecast.upper()) {
        (Some(l), Some(u)) => (l, u),
        _ => (point, point),
    };

    for (i, timestamp) in window.iter().enumerate() {
        rows.push(ForecastRow {
            timestamp: *timestamp,
            point_estimate: point[i],
            lower_bound: lower[i],
            upper_bound: upper[i],
            is_historical: false,
            fitted_value: None,
        });
    }

    Ok(rows)
}

/// Forecast-only view of an assembled table.
pub fn forecast_rows(rows: &[ForecastRow]) -> impl Iterator<Item = &ForecastRow> + '_ {
    rows.iter().filter(|r| !r.is_historical)
}

/// Timestamp of the last historical row, where the forecast begins.
pub fn forecast_start(rows: &[ForecastRow]) -> Option<DateTime<Utc>> {
    rows.iter()
        .filter(|r| r.is_historical)
        .map(|r| r.timestamp)
        .last()
}
