//! Calendar-date and number parsing shared by inference and normalization.
//!
//! A date column is read with one [`DateFormat`] for every cell. The format
//! is chosen by [`detect_date_format`] as the candidate that parses the most
//! cells, so an ambiguous slash column is never split between month-first and
//! day-first readings.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::core::Cell;

/// Date-time layouts, in preference order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts, in preference order. Month-first comes before
/// day-first, so a column that reads both ways is month-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
];

/// One way of reading a date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// RFC 3339 with an offset, converted to UTC.
    Rfc3339,
    /// A `chrono` layout with a time of day, read as UTC.
    DateTime(&'static str),
    /// A `chrono` layout without a time of day, read as midnight UTC.
    Date(&'static str),
    /// `YYYY-MM`, read as the first of the month.
    YearMonth,
}

impl DateFormat {
    /// Every candidate, in preference order.
    pub fn candidates() -> impl Iterator<Item = DateFormat> {
        std::iter::once(DateFormat::Rfc3339)
            .chain(DATETIME_FORMATS.iter().copied().map(DateFormat::DateTime))
            .chain(DATE_FORMATS.iter().copied().map(DateFormat::Date))
            .chain(std::iter::once(DateFormat::YearMonth))
    }

    pub fn parse(&self, text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match self {
            DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            DateFormat::DateTime(format) => NaiveDateTime::parse_from_str(text, format)
                .ok()
                .map(|dt| dt.and_utc()),
            DateFormat::Date(format) => NaiveDate::parse_from_str(text, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc()),
            DateFormat::YearMonth => parse_year_month(text),
        }
    }

    /// Date view of a cell. Numeric cells are never dates.
    pub fn parse_cell(&self, cell: &Cell) -> Option<DateTime<Utc>> {
        match cell {
            Cell::Text(text) => self.parse(text),
            Cell::Empty | Cell::Number(_) => None,
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFormat::Rfc3339 => f.write_str("rfc3339"),
            DateFormat::DateTime(format) | DateFormat::Date(format) => f.write_str(format),
            DateFormat::YearMonth => f.write_str("%Y-%m"),
        }
    }
}

/// Format that parses the most cells, with the number of cells it parses.
///
/// Ties go to the earlier candidate. `None` when no cell parses at all.
pub fn detect_date_format<'a>(
    cells: impl IntoIterator<Item = &'a Cell>,
) -> Option<(DateFormat, usize)> {
    let texts: Vec<&str> = cells
        .into_iter()
        .filter_map(|cell| match cell {
            Cell::Text(text) => Some(text.as_str()),
            Cell::Empty | Cell::Number(_) => None,
        })
        .collect();

    let mut best: Option<(DateFormat, usize)> = None;
    for format in DateFormat::candidates() {
        let hits = texts.iter().filter(|t| format.parse(t).is_some()).count();
        if hits > best.map_or(0, |(_, b)| b) {
            best = Some((format, hits));
        }
    }
    best
}

/// Parse a single value with the first candidate that accepts it.
///
/// Columns go through [`detect_date_format`] instead.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    DateFormat::candidates().find_map(|format| format.parse(text))
}

fn parse_year_month(text: &str) -> Option<DateTime<Utc>> {
    let (year, month) = text.split_once('-')?;
    if year.len() != 4 || !(1..=2).contains(&month.len()) {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

/// Parse text as a finite real number.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric view of a cell.
pub fn cell_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Text(text) => parse_number(text),
        Cell::Number(value) => Some(*value).filter(|v| v.is_finite()),
        Cell::Empty => None,
    }
}
