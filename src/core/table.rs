//! Raw tabular data as it arrives from an upload.

use std::collections::HashSet;

use crate::error::{Error, Result};

/// A single raw cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Build a cell from text, mapping blank text to [`Cell::Empty`].
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_string())
        }
    }

    /// Whether the cell carries no value.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Text view of the cell, if it holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::from_text(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        if text.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text)
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// Ordered rows of named cells. Every row holds exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Create an empty table with the given header.
    ///
    /// Repeated names are made unique by suffixing `.1`, `.2`, ... to later
    /// occurrences.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: dedupe_names(columns.into_iter().map(Into::into).collect()),
            rows: Vec::new(),
        }
    }

    /// Create a table from a header and rows, rejecting ragged rows.
    pub fn from_rows<S, C, R>(columns: impl IntoIterator<Item = S>, rows: R) -> Result<Self>
    where
        S: Into<String>,
        C: Into<Cell>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
    {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row.into_iter().map(Into::into).collect())?;
        }
        Ok(table)
    }

    /// Append a row.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::DimensionMismatch {
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Position of a column by name, failing with [`Error::UnknownColumn`].
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }

    /// Iterate over the cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{name}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rejects_ragged_rows() {
        let mut table = RawTable::new(["date", "value"]);
        assert!(table.push_row(vec![Cell::from("2023-01-01"), Cell::from("1")]).is_ok());

        let err = table.push_row(vec![Cell::from("2023-01-02")]).unwrap_err();
        assert_eq!(err, Error::DimensionMismatch { expected: 2, got: 1 });
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn table_renames_duplicate_headers() {
        let table = RawTable::new(["x", "x", "y", "x"]);
        assert_eq!(table.columns(), &["x", "x.1", "y", "x.2"]);
    }

    #[test]
    fn blank_text_becomes_empty_cell() {
        assert_eq!(Cell::from("   "), Cell::Empty);
        assert_eq!(Cell::from(String::new()), Cell::Empty);
        assert!(Cell::Text(" ".into()).is_empty());
        assert!(!Cell::Number(0.0).is_empty());
        assert_eq!(Cell::from("a").as_text(), Some("a"));
    }

    #[test]
    fn column_access_by_name_and_index() {
        let table = RawTable::from_rows(
            ["a", "b"],
            vec![vec!["1", "2"], vec!["3", "4"]],
        )
        .unwrap();

        assert_eq!(table.require_column("b").unwrap(), 1);
        assert_eq!(
            table.require_column("c").unwrap_err(),
            Error::UnknownColumn("c".to_string())
        );

        let b: Vec<_> = table.column(1).filter_map(Cell::as_text).collect();
        assert_eq!(b, vec!["2", "4"]);
    }
}
