//! CSV export of an assembled forecast table.

use std::io::Write;

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::prep::ForecastRow;

/// Which rows and columns to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// Forecast rows only, under `Date, Forecast, Lower CI, Upper CI`.
    #[default]
    ForecastOnly,
    /// Every row with actuals, fitted values and bounds.
    Full,
}

#[derive(Serialize)]
struct ForecastRecord<'a> {
    #[serde(rename = "Date")]
    date: &'a str,
    #[serde(rename = "Forecast")]
    forecast: f64,
    #[serde(rename = "Lower CI")]
    lower: f64,
    #[serde(rename = "Upper CI")]
    upper: f64,
}

#[derive(Serialize)]
struct FullRecord<'a> {
    date: &'a str,
    actual: Option<f64>,
    fitted: Option<f64>,
    forecast: Option<f64>,
    lower: f64,
    upper: f64,
    is_historical: bool,
}

/// Coarsest layout that keeps every timestamp distinct.
fn date_format(rows: &[ForecastRow]) -> &'static str {
    if rows.iter().any(|r| r.timestamp.nanosecond() != 0) {
        "%Y-%m-%d %H:%M:%S%.f"
    } else if rows.iter().any(|r| r.timestamp.num_seconds_from_midnight() != 0) {
        "%Y-%m-%d %H:%M:%S"
    } else {
        "%Y-%m-%d"
    }
}

fn format_date(timestamp: &DateTime<Utc>, format: &str) -> String {
    timestamp.format(format).to_string()
}

/// Write the table as CSV.
pub fn write_forecast_csv<W: Write>(rows: &[ForecastRow], writer: W, mode: ExportMode) -> Result<()> {
    let format = date_format(rows);
    let mut csv = ::csv::Writer::from_writer(writer);

    match mode {
        ExportMode::ForecastOnly => {
            // Headers come from the first record, so write them explicitly
            // for an empty forecast.
            if rows.iter().all(|r| r.is_historical) {
                csv.write_record(["Date", "Forecast", "Lower CI", "Upper CI"])?;
            }
            for row in rows.iter().filter(|r| !r.is_historical) {
                let date = format_date(&row.timestamp, format);
                csv.serialize(ForecastRecord {
                    date: &date,
                    forecast: row.point_estimate,
                    lower: row.lower_bound,
                    upper: row.upper_bound,
                })?;
            }
        }
        ExportMode::Full => {
            for row in rows {
                let date = format_date(&row.timestamp, format);
                csv.serialize(FullRecord {
                    date: &date,
                    actual: row.is_historical.then_some(row.point_estimate),
                    fitted: row.fitted_value,
                    forecast: (!row.is_historical).then_some(row.point_estimate),
                    lower: row.lower_bound,
                    upper: row.upper_bound,
                    is_historical: row.is_historical,
                })?;
            }
        }
    }

    csv.flush()?;
    Ok(())
}

/// Render the table as a CSV string.
pub fn forecast_csv_string(rows: &[ForecastRow], mode: ExportMode) -> Result<String> {
    let mut buf = Vec::new();
    write_forecast_csv(rows, &mut buf, mode)?;
    String::from_utf8(buf).map_err(|e| Error::Encoding(e.to_string()))
}
