//! # quickcast
//!
//! Forecast a time series straight from an uploaded CSV or XLSX file.
//!
//! The pipeline reads a delimited table or the first worksheet of a workbook, detects which column holds dates
//! and which holds values, normalizes them into an ordered series, builds a
//! forecast window at the series' own cadence and assembles actuals, fitted
//! values and forecasts into one exportable table.
//!
//! ```no_run
//! use quickcast::prelude::*;
//!
//! let table = read_table_from_path("sales.csv", &CsvOptions::default())?;
//! let mut session = Session::new(table, PipelineConfig::default());
//! let outcome = session.apply(Selections::default())?;
//! println!("{}", forecast_csv_string(&outcome.rows, ExportMode::ForecastOnly)?);
//! # Ok::<(), quickcast::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod models;
pub mod prep;
pub mod session;
pub mod utils;

pub use error::{Error, Result, Role, Stage};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{Forecast, RawTable, TimeSeries};
    pub use crate::error::{Error, Result};
    pub use crate::io::{forecast_csv_string, read_table, read_table_from_path, CsvOptions, ExportMode};
    pub use crate::models::{Forecaster, ModelKind};
    pub use crate::prep::{ColumnChoice, ForecastRow};
    pub use crate::session::{Outcome, Selections, Session};
}
