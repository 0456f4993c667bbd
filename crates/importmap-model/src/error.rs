//! Errors and refusals shared across crates.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The input file could not be turned into rows.
///
/// Raised before any mapping state is touched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InputFormatError {
    /// The file does not look like delimited text.
    #[error("unrecognized file '{}': expected a .csv, .tsv or .txt file", .path.display())]
    UnrecognizedFile { path: PathBuf },

    /// The file is not valid UTF-8 text.
    #[error("unsupported encoding in '{}': {encoding}", .path.display())]
    Encoding {
        path: PathBuf,
        encoding: &'static str,
    },

    /// Nothing left after dropping blank lines.
    #[error("the file appears to be empty")]
    EmptyInput,
}

/// Export was requested while some captions are still unconfirmed.
///
/// This is a user-facing refusal rather than a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportBlocked {
    /// Non-blank slots that are confirmed.
    pub confirmed: usize,
    /// Non-blank slots in total.
    pub total: usize,
}

impl ExportBlocked {
    /// Message shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        if self.confirmed == 0 {
            "There are no confirmed mappings to export yet. Confirm at least one \
             caption-to-column mapping."
                .to_string()
        } else {
            format!(
                "Not all captions are confirmed ({}/{}). Please confirm the remaining \
                 suggestions before generating the CSV.",
                self.confirmed, self.total
            )
        }
    }
}

impl fmt::Display for ExportBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ExportBlocked {}
