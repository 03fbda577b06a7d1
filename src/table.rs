//! Parcel table ingestion
//!
//! Reads the uploaded tabular artifact (XLSX/XLS first sheet, or CSV) into a
//! rectangular `ParcelTable`. The table is read once, validated, and discarded
//! after rendering; nothing here mutates the source file.

use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{Error, Result};

/// The mandatory column whose values are summed into the aggregate total.
pub const PARCEL_COUNT_COLUMN: &str = "KOLI QTY";

/// Canonical name of the print-hidden capture-time column.
pub const TIMESTAMP_COLUMN: &str = "TIMESTAMP";

/// Accepted spellings for the timestamp-like column. Normalized to
/// [`TIMESTAMP_COLUMN`] on read.
const TIMESTAMP_ALIASES: [&str; 2] = ["TIMESTAMP", "TIME STAMP"];

/// A rectangular dataset with named columns, as parsed from the upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ParcelTable {
    /// Read a table from a file path, dispatching on the extension:
    /// `.csv` goes through the delimited-text reader, everything else is
    /// treated as a spreadsheet (first sheet).
    pub fn from_path(path: &Path) -> Result<Self> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv {
            let file = std::fs::File::open(path)?;
            Self::from_csv_reader(file)
        } else {
            Self::from_workbook(path)
        }
    }

    /// Read a table from delimited text. The first record is the header row.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
        }

        Ok(Self::normalized(columns, rows))
    }

    /// Read the first sheet of a spreadsheet workbook.
    pub fn from_workbook(path: &Path) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| Error::FileRead("workbook has no sheets".to_string()))??;

        let mut row_iter = range.rows();
        let columns: Vec<String> = match row_iter.next() {
            Some(header_row) => header_row.iter().map(|c| cell_to_string(c)).collect(),
            None => Vec::new(),
        };

        let rows: Vec<Vec<String>> = row_iter
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        Ok(Self::normalized(columns, rows))
    }

    /// Apply the ingest rules shared by both readers: rename timestamp-like
    /// columns to the canonical spelling, square the row lengths off against
    /// the header, and drop rows that are entirely blank.
    fn normalized(mut columns: Vec<String>, mut rows: Vec<Vec<String>>) -> Self {
        for column in &mut columns {
            if TIMESTAMP_ALIASES
                .iter()
                .any(|alias| column.eq_ignore_ascii_case(alias))
            {
                *column = TIMESTAMP_COLUMN.to_string();
            }
        }

        let width = columns.len();
        rows.retain(|row| row.iter().any(|cell| !cell.trim().is_empty()));
        for row in &mut rows {
            row.resize(width, String::new());
        }

        Self { columns, rows }
    }

    /// Index of a column by exact (trimmed) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of the columns that appear in the printed table. The
    /// timestamp column is kept in the data (for previews and audits) but
    /// hidden from the rendered document.
    pub fn visible_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() != TIMESTAMP_COLUMN)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Render a spreadsheet cell as the string that would appear in the printed
/// table. Whole-number floats print without a trailing `.0`.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_basic() {
        let csv = "AWB,KOLI QTY\nJX001,2\nJX002,3\n";
        let table = ParcelTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.columns, vec!["AWB", "KOLI QTY"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0], vec!["JX001", "2"]);
    }

    #[test]
    fn test_csv_drops_blank_rows_and_pads_short_ones() {
        let csv = "AWB,KOLI QTY\nJX001,2\n,\nJX002\n";
        let table = ParcelTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1], vec!["JX002", ""]);
    }

    #[test]
    fn test_timestamp_alias_normalized() {
        let csv = "AWB,TIME STAMP,KOLI QTY\nJX001,2025-11-20 10:00,2\n";
        let table = ParcelTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.columns[1], TIMESTAMP_COLUMN);
    }

    #[test]
    fn test_visible_columns_hide_timestamp() {
        let csv = "AWB,TIMESTAMP,KOLI QTY\nJX001,2025-11-20 10:00,2\n";
        let table = ParcelTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.visible_columns(), vec![0, 2]);
    }

    #[test]
    fn test_column_index() {
        let csv = "AWB,KOLI QTY\nJX001,2\n";
        let table = ParcelTable::from_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.column_index(PARCEL_COUNT_COLUMN), Some(1));
        assert_eq!(table.column_index("DRIVER"), None);
    }

    #[test]
    fn test_cell_to_string_whole_float() {
        assert_eq!(cell_to_string(&Data::Float(12.0)), "12");
        assert_eq!(cell_to_string(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
