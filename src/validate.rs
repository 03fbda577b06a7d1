//! Header and table validation, and the parcel-count aggregator
//!
//! Validation is pure: it reports every problem it finds as a human-readable
//! issue and never mutates the table. The canonical numeric policy is
//! permissive (malformed counts coerce to zero); strict rejection is opt-in.

use std::fmt;

use crate::error::Error;
use crate::header::ShipmentHeader;
use crate::table::{ParcelTable, PARCEL_COUNT_COLUMN};

/// How non-numeric parcel-count cells are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NumericPolicy {
    /// Coerce malformed cells to zero (canonical behavior).
    #[default]
    Coerce,
    /// Reject the table if any parcel-count cell is not a non-negative number.
    Strict,
}

/// A single validation failure, displayable to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum TableIssue {
    Empty,
    MissingColumn(String),
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIssue::Empty => write!(f, "File has no data rows"),
            TableIssue::MissingColumn(name) => {
                write!(f, "Required column not found: {}", name)
            }
            TableIssue::NonNumeric { column, row, value } => write!(
                f,
                "Column '{}' must contain numbers (row {}: '{}')",
                column, row, value
            ),
        }
    }
}

impl TableIssue {
    /// The typed error corresponding to this issue, for callers that want to
    /// fail on the first problem instead of collecting the full list.
    pub fn into_error(self) -> Error {
        match self {
            TableIssue::Empty => Error::EmptyTable,
            TableIssue::MissingColumn(name) => Error::MissingColumn(name),
            TableIssue::NonNumeric { column, row, value } => {
                Error::NonNumericColumn { column, row, value }
            }
        }
    }
}

/// Names of header fields that are blank or whitespace-only.
///
/// All four free-text fields are mandatory; date and time always carry a
/// value by construction.
pub fn validate_header(header: &ShipmentHeader) -> Vec<String> {
    let fields = [
        ("Warehouse", header.warehouse.as_str()),
        ("Courier Name", header.courier.as_str()),
        ("Driver Name", header.driver.as_str()),
        ("Police Number", header.police.as_str()),
    ];

    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Fail on the first blank header field, for callers that want a typed error
/// instead of the message list.
pub fn ensure_header(header: &ShipmentHeader) -> crate::error::Result<()> {
    let missing = validate_header(header);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::MissingHeaderField(missing.join(", ")))
    }
}

/// Check the parsed table against the required parcel-count column.
///
/// Returns every issue found; an empty list means the table may proceed to
/// rendering. `MissingColumn` is signaled independent of row count.
pub fn validate_table(table: &ParcelTable, policy: NumericPolicy) -> Vec<TableIssue> {
    let mut issues = Vec::new();

    if table.is_empty() {
        issues.push(TableIssue::Empty);
    }

    let count_column = table.column_index(PARCEL_COUNT_COLUMN);
    if count_column.is_none() {
        issues.push(TableIssue::MissingColumn(PARCEL_COUNT_COLUMN.to_string()));
    }

    if policy == NumericPolicy::Strict {
        if let Some(col) = count_column {
            for (row_index, row) in table.rows.iter().enumerate() {
                let cell = row.get(col).map(String::as_str).unwrap_or("");
                if !is_valid_count(cell) {
                    issues.push(TableIssue::NonNumeric {
                        column: PARCEL_COUNT_COLUMN.to_string(),
                        // 1-based, matching the spreadsheet row the user sees
                        // (row 1 is the header).
                        row: row_index + 2,
                        value: cell.to_string(),
                    });
                }
            }
        }
    }

    issues
}

/// Parse one parcel-count cell, truncating to an integer.
///
/// Returns `None` for anything that does not parse as a finite number;
/// under the coerce policy those cells contribute zero to the total.
pub fn parse_count(cell: &str) -> Option<i64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

/// Strict-policy cell check: a non-negative number.
fn is_valid_count(cell: &str) -> bool {
    matches!(parse_count(cell), Some(v) if v >= 0)
}

/// Sum the parcel-count column. Malformed cells contribute zero; this never
/// errors, consistent with the permissive validation policy.
pub fn total_parcels(table: &ParcelTable) -> i64 {
    let Some(col) = table.column_index(PARCEL_COUNT_COLUMN) else {
        return 0;
    };

    table
        .rows
        .iter()
        .filter_map(|row| row.get(col))
        .filter_map(|cell| parse_count(cell))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, NaiveTime};

    fn header_with_warehouse(warehouse: &str) -> ShipmentHeader {
        ShipmentHeader {
            date: NaiveDate::from_ymd_opt(2025, 11, 20).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            warehouse: warehouse.to_string(),
            courier: "ABC Express".to_string(),
            driver: "John".to_string(),
            police: "B1234XYZ".to_string(),
            offset: FixedOffset::east_opt(7 * 3600).unwrap(),
        }
    }

    fn table(columns: &[&str], rows: &[&[&str]]) -> ParcelTable {
        ParcelTable {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_validate_header_complete() {
        assert!(validate_header(&header_with_warehouse("WH-A")).is_empty());
    }

    #[test]
    fn test_validate_header_blank_field() {
        let missing = validate_header(&header_with_warehouse("   "));
        assert_eq!(missing, vec!["Warehouse".to_string()]);
    }

    #[test]
    fn test_ensure_header_typed_error() {
        assert!(ensure_header(&header_with_warehouse("WH-A")).is_ok());
        let err = ensure_header(&header_with_warehouse("")).unwrap_err();
        assert!(matches!(err, Error::MissingHeaderField(_)));
    }

    #[test]
    fn test_validate_empty_table() {
        let t = table(&["AWB", "KOLI QTY"], &[]);
        let issues = validate_table(&t, NumericPolicy::Coerce);
        assert_eq!(issues, vec![TableIssue::Empty]);
    }

    #[test]
    fn test_validate_missing_column_any_row_count() {
        let with_rows = table(&["AWB"], &[&["JX001"]]);
        let issues = validate_table(&with_rows, NumericPolicy::Coerce);
        assert_eq!(
            issues,
            vec![TableIssue::MissingColumn("KOLI QTY".to_string())]
        );

        let without_rows = table(&["AWB"], &[]);
        let issues = validate_table(&without_rows, NumericPolicy::Coerce);
        assert!(issues.contains(&TableIssue::MissingColumn("KOLI QTY".to_string())));
    }

    #[test]
    fn test_coerce_policy_accepts_malformed_cells() {
        let t = table(&["KOLI QTY"], &[&["2"], &["abc"]]);
        assert!(validate_table(&t, NumericPolicy::Coerce).is_empty());
    }

    #[test]
    fn test_strict_policy_rejects_malformed_cells() {
        let t = table(&["KOLI QTY"], &[&["2"], &["abc"], &["-1"]]);
        let issues = validate_table(&t, NumericPolicy::Strict);
        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            TableIssue::NonNumeric { row: 3, value, .. } if value == "abc"
        ));
        assert!(matches!(
            &issues[1],
            TableIssue::NonNumeric { row: 4, value, .. } if value == "-1"
        ));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count(" 12.0 "), Some(12));
        assert_eq!(parse_count("12.9"), Some(12));
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn test_total_sums_numeric_and_zero_fills() {
        let t = table(
            &["AWB", "KOLI QTY"],
            &[&["a", "2"], &["b", "abc"], &["c", "3.0"]],
        );
        assert_eq!(total_parcels(&t), 5);
    }

    #[test]
    fn test_total_missing_column_is_zero() {
        let t = table(&["AWB"], &[&["a"]]);
        assert_eq!(total_parcels(&t), 0);
    }
}
