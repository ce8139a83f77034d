use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreasurerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unexpected CSV header in {0}")]
    UnexpectedHeader(PathBuf),

    #[error("Row {row}: invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { row: usize, value: String },

    #[error("Row {row}: invalid amount '{value}'")]
    InvalidAmount { row: usize, value: String },

    #[error("No transactions found in the CSV export.")]
    NoTransactions,

    #[error(
        "No transactions found between {start} and {end}. \
         Use --as-of to analyse an earlier period if required."
    )]
    EmptyPeriod { start: NaiveDate, end: NaiveDate },

    #[error("{what} not found: {}", path.display())]
    MissingFile { what: &'static str, path: PathBuf },

    #[error("Could not locate a header row with a 'Paid' column in the workbook")]
    NoHeaderRow,

    #[error("Could not locate block/flat columns with Paid headers")]
    NoSections,

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Spreadsheet error: {0}")]
    Xlsx(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TreasurerError>;
