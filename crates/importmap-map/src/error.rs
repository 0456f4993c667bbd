//! Error types for mapping operations.

use rapidfuzz::distance::jaro_winkler;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a "did you mean" hint.
const HINT_SIMILARITY_MIN: f64 = 0.8;

/// Errors from mapping operations.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MappingError {
    /// No slot carries this caption.
    #[error("caption not found: {caption}")]
    CaptionNotFound { caption: String },

    /// Column not found in the import file.
    #[error("column not found: {column}{}", did_you_mean(.suggestion.as_deref()))]
    ColumnNotFound {
        column: String,
        /// Closest existing column name, when one is similar enough.
        suggestion: Option<String>,
    },

    /// Column already held by a confirmed slot.
    #[error("column '{column}' already mapped to '{caption}'")]
    ColumnAlreadyUsed { column: String, caption: String },

    /// Another slot already carries this caption.
    #[error("caption '{caption}' already exists")]
    DuplicateCaption { caption: String },

    /// Suggestions were computed against an older mapping state.
    #[error("suggestions are stale: computed at version {computed}, mapping is at {current}")]
    StaleSuggestions { computed: u64, current: u64 },

    /// The slot has no pending suggestion to accept.
    #[error("no suggestion to accept for '{caption}'")]
    NoSuggestion { caption: String },

    /// Thresholds must satisfy `0 <= acceptance <= certainty <= 1`.
    #[error("invalid thresholds: acceptance {acceptance}, certainty {certainty}")]
    InvalidThresholds { acceptance: f32, certainty: f32 },
}

impl MappingError {
    /// Column-not-found error with a hint from the known column names.
    pub fn column_not_found<'a>(column: &str, known: impl IntoIterator<Item = &'a str>) -> Self {
        Self::ColumnNotFound {
            column: column.to_string(),
            suggestion: nearest_name(column, known),
        }
    }
}

fn did_you_mean(suggestion: Option<&str>) -> String {
    suggestion
        .map(|s| format!(" (did you mean '{s}'?)"))
        .unwrap_or_default()
}

/// Closest name by Jaro-Winkler similarity, ignoring case.
fn nearest_name<'a>(name: &str, known: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let target = name.trim().to_lowercase();
    known
        .into_iter()
        .map(|candidate| {
            let similarity =
                jaro_winkler::similarity(target.chars(), candidate.to_lowercase().chars());
            (candidate, similarity)
        })
        .filter(|(_, similarity)| *similarity >= HINT_SIMILARITY_MIN)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_not_found_suggests_close_name() {
        let err = MappingError::column_not_found("Emial", ["Employee ID", "Email", "Surname"]);
        assert_eq!(err.to_string(), "column not found: Emial (did you mean 'Email'?)");
    }

    #[test]
    fn column_not_found_without_hint() {
        let err = MappingError::column_not_found("Salary", ["Email", "Surname"]);
        assert_eq!(err.to_string(), "column not found: Salary");
    }
}
