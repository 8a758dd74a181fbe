//! CSV upload decoding into a [`RawTable`].

use std::path::Path;
use std::str::FromStr;

use encoding_rs::{UTF_8, WINDOWS_1252};
use tracing::debug;

use crate::core::{Cell, RawTable};
use crate::error::{Error, Result};
use crate::io::workbook::read_workbook;

/// Bytes inspected when guessing the delimiter.
const SNIFF_BYTES: usize = 1024;

/// Field separator of the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Auto,
    Byte(u8),
}

impl FromStr for Delimiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Delimiter::Auto),
            "\\t" | "tab" => Ok(Delimiter::Byte(b'\t')),
            _ if s.len() == 1 && s.is_ascii() => Ok(Delimiter::Byte(s.as_bytes()[0])),
            _ => Err(Error::InvalidParameter(format!(
                "delimiter must be a single ASCII character, 'tab' or 'auto', got '{s}'"
            ))),
        }
    }
}

/// Text encoding of the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// UTF-8 when valid, otherwise Windows-1252.
    #[default]
    Auto,
    Utf8,
    /// Windows-1252, which also serves the `latin1` and `iso-8859-1` labels.
    Windows1252,
}

impl FromStr for Encoding {
    type Err = Error;

    /// Accepts `auto` and any WHATWG label of UTF-8 or Windows-1252
    /// (`utf-8`, `utf8`, `cp1252`, `windows-1252`, `latin1`, ...).
    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Encoding::Auto);
        }
        match encoding_rs::Encoding::for_label(s.as_bytes()) {
            Some(charset) if charset == UTF_8 => Ok(Encoding::Utf8),
            Some(charset) if charset == WINDOWS_1252 => Ok(Encoding::Windows1252),
            _ => Err(Error::InvalidParameter(format!("unsupported encoding '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CsvOptions {
    pub delimiter: Delimiter,
    pub encoding: Encoding,
}

/// Decode bytes to text according to `encoding`.
pub fn decode(bytes: &[u8], encoding: Encoding) -> Result<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match encoding {
        Encoding::Utf8 => strict_utf8(bytes)
            .ok_or_else(|| Error::Encoding("input is not valid UTF-8".to_string())),
        Encoding::Windows1252 => Ok(windows_1252(bytes)),
        Encoding::Auto => Ok(strict_utf8(bytes).unwrap_or_else(|| {
            debug!("input is not valid UTF-8, decoding as Windows-1252");
            windows_1252(bytes)
        })),
    }
}

fn strict_utf8(bytes: &[u8]) -> Option<String> {
    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

fn windows_1252(bytes: &[u8]) -> String {
    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

/// Guess the delimiter from the start of the text.
///
/// Comma wins unless semicolons, tabs or pipes outnumber it.
pub fn detect_delimiter(text: &str) -> u8 {
    let sample: String = text.chars().take(SNIFF_BYTES).collect();
    let count = |c: char| sample.matches(c).count();
    let (commas, semis, tabs, pipes) = (count(','), count(';'), count('\t'), count('|'));

    if commas > semis {
        b','
    } else if semis > commas {
        b';'
    } else if tabs > commas {
        b'\t'
    } else if pipes > commas {
        b'|'
    } else {
        b','
    }
}

/// Parse a CSV upload with a header row into a table.
pub fn read_table(bytes: &[u8], options: &CsvOptions) -> Result<RawTable> {
    let text = decode(bytes, options.encoding)?;
    let delimiter = match options.delimiter {
        Delimiter::Auto => detect_delimiter(&text),
        Delimiter::Byte(b) => b,
    };

    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(Error::Csv("input has no header row".to_string()));
    }

    let mut table = RawTable::new(headers.iter().map(|h| h.trim()));
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(Cell::from_text).collect())?;
    }

    debug!(
        columns = table.columns().len(),
        rows = table.len(),
        delimiter = %(delimiter as char).escape_default(),
        "read csv table"
    );
    Ok(table)
}

/// Read an upload from disk.
///
/// `.xlsx` and `.xlsm` files are read as workbooks; anything else as CSV with
/// `options`.
pub fn read_table_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> Result<RawTable> {
    let path = path.as_ref();
    let bytes =
        std::fs::read(path).map_err(|e| Error::Io(format!("{}: {e}", path.display())))?;
    if is_workbook(path) {
        read_workbook(&bytes)
    } else {
        read_table(&bytes, options)
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_header_and_rows() {
        let table = read_table(
            b"date,value\n2023-01-01,100.5\n2023-01-02,\n",
            &CsvOptions::default(),
        )
        .unwrap();
        assert_eq!(table.columns(), &["date", "value"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0][1], Cell::Text("100.5".into()));
        assert_eq!(table.rows()[1][1], Cell::Empty);
    }

    #[test]
    fn detects_semicolons_and_tabs() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a\tb\n1\t2"), b'\t');
        assert_eq!(detect_delimiter("a|b\n1|2"), b'|');
        assert_eq!(detect_delimiter("a,b;c\n1,2;3"), b',');
        assert_eq!(detect_delimiter("single"), b',');

        let table = read_table(b"day;sales\n2023-01-01;1,5\n", &CsvOptions::default()).unwrap();
        assert_eq!(table.columns(), &["day", "sales"]);
        assert_eq!(table.rows()[0][1], Cell::Text("1,5".into()));
    }

    #[test]
    fn explicit_delimiter_overrides_detection() {
        let options = CsvOptions {
            delimiter: Delimiter::Byte(b'|'),
            ..CsvOptions::default()
        };
        let table = read_table(b"a|b\n1,2|3\n", &options).unwrap();
        assert_eq!(table.rows()[0][0], Cell::Text("1,2".into()));
    }

    #[test]
    fn windows_1252_punctuation_decodes_under_auto() {
        let table = read_table(b"item,value\n\x80 price,1\n\x93quoted\x94,2\n", &CsvOptions::default())
            .unwrap();
        assert_eq!(table.rows()[0][0], Cell::Text("\u{20ac} price".into()));
        assert_eq!(table.rows()[1][0], Cell::Text("\u{201c}quoted\u{201d}".into()));

        let explicit = CsvOptions {
            encoding: "cp1252".parse().unwrap(),
            ..CsvOptions::default()
        };
        let table = read_table(b"item,value\n\x80 price,1\n", &explicit).unwrap();
        assert_eq!(table.rows()[0][0], Cell::Text("\u{20ac} price".into()));
    }

    #[test]
    fn workbook_extension_selects_the_spreadsheet_reader() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("sales.csv");
        let xlsx_path = dir.path().join("sales.XLSX");
        std::fs::write(&csv_path, "date,value\n2023-01-01,1\n").unwrap();
        std::fs::write(&xlsx_path, "date,value\n2023-01-01,1\n").unwrap();

        let table = read_table_from_path(&csv_path, &CsvOptions::default()).unwrap();
        assert_eq!(table.len(), 1);
        assert!(matches!(
            read_table_from_path(&xlsx_path, &CsvOptions::default()),
            Err(Error::Spreadsheet(_))
        ));
        assert!(matches!(
            read_table_from_path(dir.path().join("missing.csv"), &CsvOptions::default()),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn latin1_bytes_decode_under_auto() {
        let bytes = b"city,value\nM\xfcnchen,1\n";
        let table = read_table(bytes, &CsvOptions::default()).unwrap();
        assert_eq!(table.rows()[0][0], Cell::Text("München".into()));

        let strict = CsvOptions {
            encoding: Encoding::Utf8,
            ..CsvOptions::default()
        };
        assert!(matches!(read_table(bytes, &strict), Err(Error::Encoding(_))));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let table = read_table(b"\xEF\xBB\xBFdate,value\n2023-01-01,1\n", &CsvOptions::default())
            .unwrap();
        assert_eq!(table.columns()[0], "date");
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let err = read_table(b"a,b\n1,2,3\n", &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
        assert_eq!(err.stage(), crate::error::Stage::Read);
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            read_table(b"", &CsvOptions::default()),
            Err(Error::Csv(_))
        ));
    }

    #[test]
    fn option_parsing() {
        assert_eq!("auto".parse::<Delimiter>().unwrap(), Delimiter::Auto);
        assert_eq!("tab".parse::<Delimiter>().unwrap(), Delimiter::Byte(b'\t'));
        assert_eq!(";".parse::<Delimiter>().unwrap(), Delimiter::Byte(b';'));
        assert!(";;".parse::<Delimiter>().is_err());

        assert_eq!("UTF-8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("utf8".parse::<Encoding>().unwrap(), Encoding::Utf8);
        assert_eq!("Auto".parse::<Encoding>().unwrap(), Encoding::Auto);
        for label in ["latin1", "ISO-8859-1", "cp1252", "windows-1252"] {
            assert_eq!(label.parse::<Encoding>().unwrap(), Encoding::Windows1252, "{label}");
        }
        assert!("shift_jis".parse::<Encoding>().is_err());
        assert!("klingon".parse::<Encoding>().is_err());
    }
}
