//! Data preparation between upload and model: column inference, series
//! normalization, forecast windows and result assembly.

pub mod assemble;
pub mod infer;
pub mod normalize;
pub mod parse;
pub mod window;

pub use assemble::{assemble, forecast_rows, forecast_start, ForecastRow};
pub use infer::{
    column_profiles, infer_columns, resolve_columns, ColumnChoice, ColumnProfile, ColumnRole,
    ColumnRoles, InferenceConfig,
};
pub use normalize::{normalize, DuplicatePolicy, NormalizeConfig, Normalized, ParseWarning};
pub use parse::{detect_date_format, parse_date, parse_number, DateFormat};
pub use window::{
    build_window, build_window_with, infer_interval, infer_step, validate_horizon, Interval,
    WindowConfig, MAX_HORIZON, MIN_HORIZON,
};
