//! Error types for the BAST generator library

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the BAST generator library
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text parsing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet parsing error
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Uploaded artifact could not be read as a table
    #[error("Failed to read file: {0}")]
    FileRead(String),

    /// A mandatory header field is blank
    #[error("Missing header field: {0}")]
    MissingHeaderField(String),

    /// The parsed table has zero data rows
    #[error("File has no data rows")]
    EmptyTable,

    /// The required parcel-count column is absent
    #[error("Required column not found: {0}")]
    MissingColumn(String),

    /// A parcel-count cell failed numeric validation (strict policy)
    #[error("Column '{column}' must contain numbers (row {row}: '{value}')")]
    NonNumericColumn {
        column: String,
        row: usize,
        value: String,
    },

    /// Invalid date input
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Invalid time input
    #[error("Invalid time: {0}")]
    InvalidTime(String),

    /// Invalid UTC offset input
    #[error("Invalid UTC offset: {0}")]
    InvalidUtcOffset(String),

    /// Any failure during the two-pass pagination/finalize sequence
    #[error("Failed to render document: {0}")]
    Render(String),

    /// General error
    #[error("{0}")]
    General(String),
}
