//! Automatic detection of the date and value columns.
//!
//! Every column is scored by how many of its non-empty cells parse as a
//! date and as a number. The best-scoring column at or above the threshold
//! wins each role; ties go to the leftmost column.

use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::core::{Cell, RawTable};
use crate::error::{Error, Result, Role};
use crate::prep::parse::{cell_number, detect_date_format, DateFormat};

/// Role assigned to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Date,
    Value,
    Unused,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnRole::Date => "date",
            ColumnRole::Value => "value",
            ColumnRole::Unused => "-",
        })
    }
}

/// Manual or automatic choice for one role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnChoice {
    #[default]
    Auto,
    Named(String),
}

impl ColumnChoice {
    /// `None` or the literal `"auto"` (any case) map to [`ColumnChoice::Auto`].
    pub fn from_option(name: Option<&str>) -> Self {
        match name {
            None => ColumnChoice::Auto,
            Some(name) if name.eq_ignore_ascii_case("auto") => ColumnChoice::Auto,
            Some(name) => ColumnChoice::Named(name.to_string()),
        }
    }
}

/// Settings for automatic column detection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Minimum fraction of non-empty cells that must parse for a column to
    /// qualify for a role.
    pub threshold: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self { threshold: 0.9 }
    }
}

impl InferenceConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(Error::Config(format!(
                "inference threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Parse statistics for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub name: String,
    pub non_empty: usize,
    /// Layout that reads the most cells as dates.
    pub date_format: Option<DateFormat>,
    /// Fraction of non-empty cells that parse as a date under `date_format`.
    pub date_fraction: f64,
    /// Fraction of non-empty cells that parse as a finite number.
    pub number_fraction: f64,
}

/// Profile every column of the table, left to right.
pub fn column_profiles(table: &RawTable) -> Vec<ColumnProfile> {
    table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| profile_column(name, table.column(idx)))
        .collect()
}

fn profile_column<'a>(name: &str, cells: impl Iterator<Item = &'a Cell>) -> ColumnProfile {
    let cells: Vec<&Cell> = cells.filter(|c| !c.is_empty()).collect();
    let non_empty = cells.len();
    let numbers = cells.iter().filter(|c| cell_number(c).is_some()).count();
    let detected = detect_date_format(cells.iter().copied());

    let fraction = |hits: usize| {
        if non_empty == 0 {
            0.0
        } else {
            hits as f64 / non_empty as f64
        }
    };

    ColumnProfile {
        name: name.to_string(),
        non_empty,
        date_format: detected.map(|(format, _)| format),
        date_fraction: fraction(detected.map_or(0, |(_, hits)| hits)),
        number_fraction: fraction(numbers),
    }
}

/// Index of the best qualifying column, leftmost on ties.
fn best_column(
    profiles: &[ColumnProfile],
    threshold: f64,
    exclude: Option<usize>,
    score: impl Fn(&ColumnProfile) -> f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, profile) in profiles.iter().enumerate() {
        if Some(idx) == exclude {
            continue;
        }
        let s = score(profile);
        if s < threshold {
            continue;
        }
        // Strictly greater keeps the leftmost column on ties.
        if best.map_or(true, |(_, b)| s > b) {
            best = Some((idx, s));
        }
    }
    best.map(|(idx, _)| idx)
}

fn pick_date(profiles: &[ColumnProfile], config: &InferenceConfig, exclude: Option<usize>) -> Result<usize> {
    best_column(profiles, config.threshold, exclude, |p| p.date_fraction)
        .ok_or(Error::ColumnInference { role: Role::Date })
}

fn pick_value(profiles: &[ColumnProfile], config: &InferenceConfig, exclude: Option<usize>) -> Result<usize> {
    best_column(profiles, config.threshold, exclude, |p| p.number_fraction)
        .ok_or(Error::ColumnInference { role: Role::Value })
}

/// Detect the date and value columns of a table.
///
/// Returns `(date_column, value_column)` names.
pub fn infer_columns(table: &RawTable, config: &InferenceConfig) -> Result<(String, String)> {
    let profiles = column_profiles(table);
    let date = pick_date(&profiles, config, None)?;
    let value = pick_value(&profiles, config, Some(date))?;

    debug!(
        date = %profiles[date].name,
        date_format = ?profiles[date].date_format,
        date_fraction = profiles[date].date_fraction,
        value = %profiles[value].name,
        value_fraction = profiles[value].number_fraction,
        "inferred columns"
    );

    Ok((profiles[date].name.clone(), profiles[value].name.clone()))
}

/// Final role assignment for every column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRoles {
    columns: Vec<String>,
    roles: Vec<ColumnRole>,
    date: usize,
    value: usize,
}

impl ColumnRoles {
    fn new(columns: &[String], date: usize, value: usize) -> Self {
        let roles = (0..columns.len())
            .map(|idx| match idx {
                i if i == date => ColumnRole::Date,
                i if i == value => ColumnRole::Value,
                _ => ColumnRole::Unused,
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            roles,
            date,
            value,
        }
    }

    pub fn date_column(&self) -> &str {
        &self.columns[self.date]
    }

    pub fn value_column(&self) -> &str {
        &self.columns[self.value]
    }

    /// Role of a column by name, `None` if the column is unknown.
    pub fn role_of(&self, name: &str) -> Option<ColumnRole> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.roles[idx])
    }

    /// `(column, role)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnRole)> + '_ {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.roles.iter().copied())
    }
}

/// Resolve manual and automatic choices into a full role assignment.
///
/// Named columns must exist. When only one role is named, the other is
/// inferred among the remaining columns.
pub fn resolve_columns(
    table: &RawTable,
    date: &ColumnChoice,
    value: &ColumnChoice,
    config: &InferenceConfig,
) -> Result<ColumnRoles> {
    let named = |choice: &ColumnChoice| match choice {
        ColumnChoice::Auto => Ok(None),
        ColumnChoice::Named(name) => table.require_column(name).map(Some),
    };
    let manual_date = named(date)?;
    let manual_value = named(value)?;

    let (date_idx, value_idx) = match (manual_date, manual_value) {
        (Some(d), Some(v)) => (d, v),
        (None, None) => {
            let profiles = column_profiles(table);
            let d = pick_date(&profiles, config, None)?;
            (d, pick_value(&profiles, config, Some(d))?)
        }
        (Some(d), None) => (d, pick_value(&column_profiles(table), config, Some(d))?),
        (None, Some(v)) => (pick_date(&column_profiles(table), config, Some(v))?, v),
    };

    if date_idx == value_idx {
        return Err(Error::InvalidParameter(format!(
            "column '{}' cannot be both the date and the value column",
            table.columns()[date_idx]
        )));
    }

    let roles = ColumnRoles::new(table.columns(), date_idx, value_idx);
    debug!(
        date = roles.date_column(),
        value = roles.value_column(),
        "resolved columns"
    );
    Ok(roles)
}
