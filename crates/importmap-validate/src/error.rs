//! Error types for validation and corrections.

use thiserror::Error;

/// Validation could not run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidateError {
    /// Validation runs only once every caption is confirmed.
    #[error("validation needs every caption confirmed ({confirmed}/{total} confirmed)")]
    Unconfirmed { confirmed: usize, total: usize },
}

/// A cell correction could not be applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CorrectionError {
    #[error("caption not found: {caption}")]
    CaptionNotFound { caption: String },

    #[error("caption '{caption}' has no column assigned")]
    Unassigned { caption: String },

    #[error("column '{column}' is not in the import file")]
    ColumnMissing { column: String },

    /// Row numbers are 1-based and count the header row when there is one.
    #[error("row {row} is not a data row (valid rows: {first}-{last})")]
    RowOutOfRange { row: usize, first: usize, last: usize },
}
