//! Error types for the quickcast library.

use std::fmt;

use thiserror::Error;

/// Result type alias for quickcast operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The role a column plays in a forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Date,
    Value,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Date => f.write_str("date"),
            Role::Value => f.write_str("value"),
        }
    }
}

/// Pipeline stage an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Read,
    Inference,
    Normalize,
    Window,
    Model,
    Assemble,
    Config,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Read => "reading the file",
            Stage::Inference => "column detection",
            Stage::Normalize => "series preparation",
            Stage::Window => "forecast window",
            Stage::Model => "model fitting",
            Stage::Assemble => "result assembly",
            Stage::Config => "configuration",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while preparing and forecasting a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No column qualified for the given role.
    #[error("could not auto-detect a {role} column - please select it manually")]
    ColumnInference { role: Role },

    /// Too few valid rows survived normalization.
    #[error("not enough valid rows to forecast: need at least {needed}, got {got}")]
    EmptySeries { needed: usize, got: usize },

    /// Horizon outside the supported range.
    #[error("forecast horizon must be between 1 and 365, got {horizon}")]
    InvalidHorizon { horizon: usize },

    /// A manually selected column is not in the table.
    #[error("column '{0}' not found")]
    UnknownColumn(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    Timestamp(String),

    /// Insufficient data points for a model.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Malformed CSV input or output.
    #[error("csv error: {0}")]
    Csv(String),

    /// Unreadable spreadsheet workbook.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Input bytes could not be decoded as text.
    #[error("could not decode input: {0}")]
    Encoding(String),

    /// I/O failure.
    #[error("i/o error: {0}")]
    Io(String),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Stage of the pipeline this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Error::ColumnInference { .. } | Error::UnknownColumn(_) => Stage::Inference,
            Error::EmptySeries { .. } => Stage::Normalize,
            Error::InvalidHorizon { .. } => Stage::Window,
            Error::InsufficientData { .. } | Error::FitRequired => Stage::Model,
            Error::DimensionMismatch { .. } | Error::Timestamp(_) => Stage::Assemble,
            Error::Csv(_) | Error::Spreadsheet(_) | Error::Encoding(_) | Error::Io(_) => {
                Stage::Read
            }
            Error::Config(_) | Error::InvalidParameter(_) => Stage::Config,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

impl From<calamine::XlsxError> for Error {
    fn from(err: calamine::XlsxError) -> Self {
        Error::Spreadsheet(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
