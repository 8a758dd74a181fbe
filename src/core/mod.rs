//! Core data structures: raw tables, time series and forecasts.

mod forecast;
mod table;
mod time_series;

pub use forecast::Forecast;
pub use table::{Cell, RawTable};
pub use time_series::TimeSeries;
