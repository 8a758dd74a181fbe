//! Conversion of the chosen raw columns into a clean [`TimeSeries`].

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::{RawTable, TimeSeries};
use crate::error::{Error, Result};
use crate::prep::parse::{cell_number, detect_date_format};

/// Minimum number of observations a forecast needs.
pub const MIN_OBSERVATIONS: usize = 2;

/// Number of offending row numbers kept in a [`ParseWarning`].
const SAMPLE_ROWS: usize = 5;

/// Which observation survives when timestamps repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    KeepFirst,
    #[default]
    KeepLast,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    pub duplicates: DuplicatePolicy,
}

/// Non-fatal report of rows that did not make it into the series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParseWarning {
    /// Rows dropped because the date or value did not parse.
    pub dropped_rows: usize,
    /// 1-based data row numbers of the first few dropped rows.
    pub sample_rows: Vec<usize>,
    /// Rows collapsed into another row with the same timestamp.
    pub duplicate_rows: usize,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.dropped_rows > 0 {
            let rows: Vec<String> = self.sample_rows.iter().map(|r| r.to_string()).collect();
            let more = if self.dropped_rows > self.sample_rows.len() { ", ..." } else { "" };
            parts.push(format!(
                "skipped {} row(s) with an unreadable date or value (rows {}{})",
                self.dropped_rows,
                rows.join(", "),
                more
            ));
        }
        if self.duplicate_rows > 0 {
            parts.push(format!(
                "merged {} row(s) with a repeated timestamp",
                self.duplicate_rows
            ));
        }
        f.write_str(&parts.join("; "))
    }
}

/// A normalized series and what was discarded to get it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub series: TimeSeries,
    pub warning: Option<ParseWarning>,
}

/// Build a sorted, de-duplicated series from two columns of a table.
///
/// The date column is read with the single layout that parses most of its
/// cells. Rows that do not match it are dropped and reported.
pub fn normalize(
    table: &RawTable,
    date_column: &str,
    value_column: &str,
    config: &NormalizeConfig,
) -> Result<Normalized> {
    let date_idx = table.require_column(date_column)?;
    let value_idx = table.require_column(value_column)?;

    let format = detect_date_format(table.column(date_idx)).map(|(format, _)| format);
    debug!(column = date_column, format = ?format, "date layout");

    let mut warning = ParseWarning::default();
    let mut points: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();

    for (row_no, row) in table.rows().iter().enumerate() {
        let timestamp = format.and_then(|f| f.parse_cell(&row[date_idx]));
        let parsed = timestamp.zip(cell_number(&row[value_idx]));
        let Some((timestamp, value)) = parsed else {
            warning.dropped_rows += 1;
            if warning.sample_rows.len() < SAMPLE_ROWS {
                warning.sample_rows.push(row_no + 1);
            }
            continue;
        };

        match points.entry(timestamp) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                warning.duplicate_rows += 1;
                if config.duplicates == DuplicatePolicy::KeepLast {
                    slot.insert(value);
                }
            }
        }
    }

    if points.len() < MIN_OBSERVATIONS {
        return Err(Error::EmptySeries {
            needed: MIN_OBSERVATIONS,
            got: points.len(),
        });
    }

    let (timestamps, values): (Vec<_>, Vec<_>) = points.into_iter().unzip();
    let series = TimeSeries::new(timestamps, values)?.with_label(value_column);

    let warning = if warning.dropped_rows > 0 || warning.duplicate_rows > 0 {
        warn!(
            dropped = warning.dropped_rows,
            duplicates = warning.duplicate_rows,
            "rows discarded during normalization"
        );
        Some(warning)
    } else {
        None
    };

    debug!(
        observations = series.len(),
        date = date_column,
        value = value_column,
        "normalized series"
    );

    Ok(Normalized { series, warning })
}
