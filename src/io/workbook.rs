//! XLSX upload decoding into a [`RawTable`].
//!
//! The first worksheet is read; its first row is the header. Numeric cells
//! stay numeric and date cells become ISO text, so inference and
//! normalization treat a workbook like the equivalent CSV.

use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};
use tracing::debug;

use crate::core::{Cell, RawTable};
use crate::error::{Error, Result};

/// Layout for spreadsheet date cells. Whole seconds print no fraction.
const DATETIME_TEXT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Parse the first worksheet of an XLSX workbook.
pub fn read_workbook(bytes: &[u8]) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Spreadsheet("workbook has no worksheets".to_string()))??;

    let mut rows = sheet.rows();
    let header = rows
        .next()
        .ok_or_else(|| Error::Spreadsheet("worksheet has no header row".to_string()))?;

    let mut table = RawTable::new(header.iter().map(|c| c.to_string().trim().to_string()));
    for row in rows {
        table.push_row(row.iter().map(data_cell).collect())?;
    }

    debug!(
        columns = table.columns().len(),
        rows = table.len(),
        "read xlsx worksheet"
    );
    Ok(table)
}

fn data_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from_text(s),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Cell::Text(naive.format(DATETIME_TEXT).to_string()),
            None => Cell::from_text(&data.to_string()),
        },
        Data::Error(e) => Cell::Text(format!("#{e:?}")),
    }
}
