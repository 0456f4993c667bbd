//! Error types for import file ingestion.

use std::path::PathBuf;

use importmap_model::InputFormatError;
use thiserror::Error;

/// Errors raised while reading or writing delimited text.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The content cannot be treated as a delimited import file.
    #[error(transparent)]
    Input(#[from] InputFormatError),

    /// Import file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read the import file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write delimited output.
    #[error("failed to write delimited output: {0}")]
    Write(#[from] csv::Error),
}

impl CodecError {
    /// True when the problem lies with the file's content rather than I/O.
    pub fn is_input_format(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, CodecError>;
