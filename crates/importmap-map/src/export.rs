//! Export of the mapped table.

use std::path::Path;

use importmap_ingest::{CodecError, serialize};
use importmap_model::{Delimiter, ExportBlocked, ImportColumn, ImportTable};
use thiserror::Error;

use crate::state::MappingState;

/// File name used when the input name is unknown.
const FALLBACK_STEM: &str = "mapped-output";

/// Errors from [`export`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExportError {
    /// Some captions are not confirmed yet.
    #[error(transparent)]
    Blocked(#[from] ExportBlocked),

    /// Writing the delimited output failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ExportError {
    /// The refusal, when export was blocked rather than failed.
    pub fn blocked(&self) -> Option<&ExportBlocked> {
        match self {
            Self::Blocked(blocked) => Some(blocked),
            Self::Codec(_) => None,
        }
    }
}

/// Write the table with captions as headers.
///
/// Refused unless every non-blank caption is confirmed. The header row holds
/// the confirmed captions in slot order and every data row is projected onto
/// the mapped column indices; missing cells come out empty.
pub fn export(
    state: &MappingState,
    table: &ImportTable,
    columns: &[ImportColumn],
    delimiter: Delimiter,
) -> Result<String, ExportError> {
    let summary = state.summary();
    let mappings = state.confirmed_mappings();
    if mappings.is_empty() || summary.confirmed != summary.total {
        return Err(ExportBlocked {
            confirmed: summary.confirmed,
            total: summary.total,
        }
        .into());
    }

    let headers: Vec<String> = mappings
        .iter()
        .map(|(caption, _)| (*caption).to_string())
        .collect();
    let indices: Vec<Option<usize>> = mappings
        .iter()
        .map(|(_, column)| columns.iter().find(|c| c.name == *column).map(|c| c.index))
        .collect();

    let rows: Vec<Vec<String>> = table
        .data_rows()
        .iter()
        .map(|row| {
            indices
                .iter()
                .map(|idx| {
                    idx.and_then(|i| row.get(i))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    tracing::info!(
        headers = headers.len(),
        rows = rows.len(),
        delimiter = %delimiter,
        "Exporting mapped table"
    );
    Ok(serialize(&rows, &headers, delimiter)?)
}

/// Output file name derived from the input path: `people.csv` becomes
/// `people-mapped.csv`.
pub fn export_file_name(input: Option<&Path>, delimiter: Delimiter) -> String {
    let stem = input
        .and_then(Path::file_stem)
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_STEM);
    let extension = match delimiter {
        Delimiter::Comma => "csv",
        Delimiter::Tab => "tsv",
    };
    format!("{stem}-mapped.{extension}")
}
