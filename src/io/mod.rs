//! Upload decoding (CSV and XLSX) and forecast export.

pub mod export;
pub mod upload;
pub mod workbook;

pub use export::{forecast_csv_string, write_forecast_csv, ExportMode};
pub use upload::{decode, detect_delimiter, read_table, read_table_from_path, CsvOptions, Delimiter, Encoding};
pub use workbook::read_workbook;
