//! Future timestamps for a forecast request.
//!
//! The sampling interval is the median gap between consecutive observations,
//! which tolerates the occasional missing day. Future timestamps step
//! uniformly from the last observation; there is no weekend or holiday
//! skipping.

use chrono::{DateTime, Datelike, Duration, Months, Timelike, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::core::TimeSeries;
use crate::error::{Error, Result};

/// Smallest accepted horizon.
pub const MIN_HORIZON: usize = 1;
/// Largest accepted horizon.
pub const MAX_HORIZON: usize = 365;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Step by calendar months when every observation falls on the same day
    /// of month and time of day a whole number of months apart.
    pub calendar_months: bool,
}

/// Spacing between consecutive forecast timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Fixed(Duration),
    Months(u32),
}

impl Interval {
    fn advance(&self, from: DateTime<Utc>, steps: u32) -> Result<DateTime<Utc>> {
        let next = match *self {
            Interval::Fixed(step) => step
                .checked_mul(steps as i32)
                .and_then(|offset| from.checked_add_signed(offset)),
            Interval::Months(months) => months
                .checked_mul(steps)
                .and_then(|m| from.checked_add_months(Months::new(m))),
        };
        next.ok_or_else(|| Error::Timestamp("forecast window overflows the calendar".to_string()))
    }
}

/// Reject horizons outside `MIN_HORIZON..=MAX_HORIZON`.
pub fn validate_horizon(horizon: usize) -> Result<()> {
    if (MIN_HORIZON..=MAX_HORIZON).contains(&horizon) {
        Ok(())
    } else {
        Err(Error::InvalidHorizon { horizon })
    }
}

/// Median gap between consecutive timestamps, at nanosecond resolution.
pub fn infer_interval(series: &TimeSeries) -> Result<Duration> {
    if series.len() < 2 {
        return Err(Error::InsufficientData {
            needed: 2,
            got: series.len(),
        });
    }

    let mut gaps = series
        .gaps()
        .map(|g| g.num_nanoseconds())
        .collect::<Option<Vec<i64>>>()
        .ok_or_else(|| {
            Error::Timestamp("observations are too far apart to infer an interval".to_string())
        })?;
    gaps.sort_unstable();
    let n = gaps.len();
    let median = if n % 2 == 0 {
        // Halve before adding so huge gaps cannot overflow.
        gaps[n / 2 - 1] / 2 + gaps[n / 2] / 2 + (gaps[n / 2 - 1] % 2 + gaps[n / 2] % 2) / 2
    } else {
        gaps[n / 2]
    };

    if median <= 0 {
        return Err(Error::Timestamp(
            "observations are too close together to infer an interval".to_string(),
        ));
    }
    Ok(Duration::nanoseconds(median))
}

/// Whole-month spacing shared by every pair of observations, if any.
fn calendar_month_step(series: &TimeSeries) -> Option<u32> {
    let first = *series.timestamps().first()?;
    let same_slot = series.timestamps().iter().all(|t| {
        t.day() == first.day() && t.num_seconds_from_midnight() == first.num_seconds_from_midnight()
    });
    if !same_slot {
        return None;
    }

    let month_index = |t: &DateTime<Utc>| t.year() as i64 * 12 + t.month0() as i64;
    let mut step = None;
    for pair in series.timestamps().windows(2) {
        let diff = month_index(&pair[1]) - month_index(&pair[0]);
        match step {
            None if diff > 0 => step = Some(diff),
            Some(s) if s == diff => {}
            _ => return None,
        }
    }
    step.and_then(|s| u32::try_from(s).ok())
}

/// Spacing to use for the forecast window.
pub fn infer_step(series: &TimeSeries, config: &WindowConfig) -> Result<Interval> {
    if config.calendar_months {
        if let Some(months) = calendar_month_step(series) {
            return Ok(Interval::Months(months));
        }
    }
    infer_interval(series).map(Interval::Fixed)
}

/// Build `horizon` future timestamps with the default configuration.
pub fn build_window(series: &TimeSeries, horizon: usize) -> Result<Vec<DateTime<Utc>>> {
    build_window_with(series, horizon, &WindowConfig::default())
}

/// Build `horizon` future timestamps, the first one step after the last
/// observation.
pub fn build_window_with(
    series: &TimeSeries,
    horizon: usize,
    config: &WindowConfig,
) -> Result<Vec<DateTime<Utc>>> {
    validate_horizon(horizon)?;
    let step = infer_step(series, config)?;
    let last = series.last_timestamp().ok_or(Error::InsufficientData {
        needed: 2,
        got: 0,
    })?;

    let window = (1..=horizon as u32)
        .map(|k| step.advance(last, k))
        .collect::<Result<Vec<_>>>()?;

    debug!(horizon, step = ?step, "built forecast window");
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn series(timestamps: Vec<DateTime<Utc>>) -> TimeSeries {
        let values = (0..timestamps.len()).map(|i| i as f64).collect();
        TimeSeries::new(timestamps, values).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn daily_window_continues_after_last_observation() {
        let s = series(vec![day(2023, 1, 1), day(2023, 1, 2)]);
        let window = build_window(&s, 3).unwrap();
        assert_eq!(
            window,
            vec![day(2023, 1, 3), day(2023, 1, 4), day(2023, 1, 5)]
        );
    }

    #[test]
    fn horizon_bounds_are_enforced() {
        let s = series(vec![day(2023, 1, 1), day(2023, 1, 2)]);
        assert_eq!(
            build_window(&s, 0).unwrap_err(),
            Error::InvalidHorizon { horizon: 0 }
        );
        assert_eq!(
            build_window(&s, 366).unwrap_err(),
            Error::InvalidHorizon { horizon: 366 }
        );
        assert_eq!(
            build_window(&s, 400).unwrap_err(),
            Error::InvalidHorizon { horizon: 400 }
        );
        assert_eq!(build_window(&s, 365).unwrap().len(), 365);
    }

    #[test]
    fn median_gap_ignores_occasional_missing_days() {
        let s = series(vec![
            day(2023, 1, 1),
            day(2023, 1, 2),
            day(2023, 1, 3),
            day(2023, 1, 6),
            day(2023, 1, 7),
        ]);
        assert_eq!(infer_interval(&s).unwrap(), Duration::days(1));
    }

    #[test]
    fn even_gap_count_averages_the_middle_pair() {
        let base = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let s = series(vec![
            base,
            base + Duration::hours(1),
            base + Duration::hours(3),
        ]);
        assert_eq!(infer_interval(&s).unwrap(), Duration::minutes(90));
    }

    #[test]
    fn sub_millisecond_spacing_is_kept() {
        let base = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let s = series((0..4).map(|i| base + Duration::microseconds(250 * i)).collect());
        assert_eq!(infer_interval(&s).unwrap(), Duration::microseconds(250));

        let window = build_window(&s, 2).unwrap();
        assert_eq!(
            window,
            vec![base + Duration::microseconds(1000), base + Duration::microseconds(1250)]
        );
    }

    #[test]
    fn weekly_series_steps_by_a_week() {
        let s = series(vec![day(2023, 1, 2), day(2023, 1, 9), day(2023, 1, 16)]);
        let window = build_window(&s, 2).unwrap();
        assert_eq!(window, vec![day(2023, 1, 23), day(2023, 1, 30)]);
    }

    #[test]
    fn monthly_series_uses_calendar_months_when_enabled() {
        let s = series(vec![day(2023, 1, 1), day(2023, 2, 1), day(2023, 3, 1)]);

        let uniform = build_window(&s, 2).unwrap();
        // Median gap is 29.5 days.
        assert_eq!(uniform[0], day(2023, 3, 1) + Duration::hours(29 * 24 + 12));

        let config = WindowConfig {
            calendar_months: true,
        };
        let calendar = build_window_with(&s, 3, &config).unwrap();
        assert_eq!(
            calendar,
            vec![day(2023, 4, 1), day(2023, 5, 1), day(2023, 6, 1)]
        );
    }

    #[test]
    fn calendar_months_falls_back_for_irregular_series() {
        let s = series(vec![day(2023, 1, 1), day(2023, 1, 2), day(2023, 2, 1)]);
        let config = WindowConfig {
            calendar_months: true,
        };
        assert!(matches!(infer_step(&s, &config).unwrap(), Interval::Fixed(_)));

        let quarterly = series(vec![day(2022, 1, 15), day(2022, 4, 15), day(2022, 7, 15)]);
        assert_eq!(infer_step(&quarterly, &config).unwrap(), Interval::Months(3));
    }

    #[test]
    fn single_observation_has_no_interval() {
        let s = series(vec![day(2023, 1, 1)]);
        assert_eq!(
            infer_interval(&s).unwrap_err(),
            Error::InsufficientData { needed: 2, got: 1 }
        );
    }
}
