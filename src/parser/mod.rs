//! Delimited text import/export for tables
//!
//! Line 0 is the header; every later line becomes one row of type-sniffed
//! cells (see [`Value::infer`]). Fields are split on the table's single
//! ASCII delimiter with no quoting, matching the export side. Ragged lines
//! are tolerated: short lines are padded with Null cells to header width,
//! over-long lines are truncated to it with a logged warning.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use thiserror::Error;
use tracing::warn;

use crate::model::{Row, Table, Value};

/// Failures while reading or writing delimited text.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed delimited text: {0}")]
    Csv(#[from] csv::Error),
    #[error("input has no header line")]
    MissingHeader,
}

/// Import a delimited text file into a table.
pub fn import_from_path(path: &Path, delimiter: char) -> Result<Table, ImportError> {
    let file = File::open(path)?;
    read_table(BufReader::new(file), delimiter)
}

/// Import delimited text from memory.
pub fn import_from_str(text: &str, delimiter: char) -> Result<Table, ImportError> {
    read_table(text.as_bytes(), delimiter)
}

fn read_table<R: Read>(reader: R, delimiter: char) -> Result<Table, ImportError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(reader);

    let header: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if header.is_empty() || (header.len() == 1 && header[0].is_empty()) {
        return Err(ImportError::MissingHeader);
    }
    let cols = header.len();

    let mut cells = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.len() > cols {
            warn!(
                line = line + 2,
                got = record.len(),
                expected = cols,
                "extra fields truncated to header width"
            );
        }
        let mut row = Row::with_capacity(cols);
        for field in record.iter().take(cols) {
            row.push(Value::infer(field));
        }
        while row.len() < cols {
            row.push(Value::new());
        }
        cells.push(row);
    }

    Ok(Table::from_parts(delimiter, header, cells, std::iter::empty()))
}

/// Render a table as delimited text: header line first, then one line per
/// row of `as_string` cells. No quoting — a field containing the delimiter
/// corrupts the line, exactly as the import side assumes.
pub fn export_to_string(table: &Table) -> String {
    let sep = table.delimiter().to_string();
    let mut out = String::new();
    out.push_str(&table.header().join(&sep));
    out.push('\n');
    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(|v| v.as_string()).collect();
        out.push_str(&fields.join(&sep));
        out.push('\n');
    }
    out
}

/// Write [`export_to_string`] output to a file.
pub fn export_to_path(table: &Table, path: &Path) -> Result<(), ImportError> {
    std::fs::write(path, export_to_string(table))?;
    Ok(())
}

impl Table {
    /// See [`import_from_path`].
    pub fn import_from_file(
        path: impl AsRef<Path>,
        delimiter: char,
    ) -> Result<Table, ImportError> {
        import_from_path(path.as_ref(), delimiter)
    }

    /// See [`import_from_str`].
    pub fn import_from_string(text: &str, delimiter: char) -> Result<Table, ImportError> {
        import_from_str(text, delimiter)
    }

    /// See [`export_to_string`].
    pub fn export_to_string(&self) -> String {
        export_to_string(self)
    }

    /// See [`export_to_path`].
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<(), ImportError> {
        export_to_path(self, path.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueType;

    #[test]
    fn test_import_sniffs_cell_types() {
        let table =
            import_from_str("ticker,count,stamp,price\nTECL,4,1597122000,12.5\n", ',').unwrap();
        assert_eq!(table.number_of_rows(), 1);
        assert_eq!(table.number_of_cols(), 4);
        assert_eq!(table.get(0, 0).value_type(), ValueType::String);
        assert_eq!(table.get(0, 1).value_type(), ValueType::Long);
        assert_eq!(table.get(0, 2).as_long(), 1597122000);
        assert_eq!(table.get(0, 3).value_type(), ValueType::Float);
    }

    #[test]
    fn test_import_pads_short_lines_with_null() {
        let table = import_from_str("a,b,c\n1,2\n", ',').unwrap();
        assert_eq!(table.number_of_cols(), 3);
        assert_eq!(table.row(0).len(), 3);
        assert!(table.get(0, 2).is_null());
    }

    #[test]
    fn test_import_truncates_long_lines() {
        let table = import_from_str("a,b\n1,2,3,4\n", ',').unwrap();
        assert_eq!(table.row(0).len(), 2);
        assert_eq!(table.get(0, 1).as_int(), 2);
    }

    #[test]
    fn test_import_custom_delimiter_and_no_quoting() {
        let table = import_from_str("name;note\nx;\"quoted\"\n", ';').unwrap();
        assert_eq!(table.get(0, 1).as_string(), "\"quoted\"");
    }

    #[test]
    fn test_import_empty_input_is_error() {
        assert!(import_from_str("", ',').is_err());
    }

    #[test]
    fn test_export_round_trip() {
        let text = "ticker,count\nTECL,4\nSOXL,7\n";
        let table = import_from_str(text, ',').unwrap();
        assert_eq!(export_to_string(&table), text);
    }

    #[test]
    fn test_export_formats_floats_with_fixed_precision() {
        let table = import_from_str("x\n1.5\n", ',').unwrap();
        assert_eq!(export_to_string(&table), "x\n1.500000\n");
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        let table = import_from_str("a,b\n1,2\n", ',').unwrap();
        table.export_to_file(&path).unwrap();
        let back = Table::import_from_file(&path, ',').unwrap();
        assert_eq!(back, table);
    }
}
