//! Wire contract of the remote suggestion provider.
//!
//! Field names follow the provider's camelCase JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A proposed column-to-caption assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub csv_column: String,
    pub target_caption: String,
    /// Estimated match quality in `[0, 1]`.
    pub confidence: f32,
}

impl MatchCandidate {
    #[must_use]
    pub fn new(csv_column: impl Into<String>, target_caption: impl Into<String>, confidence: f32) -> Self {
        Self {
            csv_column: csv_column.into(),
            target_caption: target_caption.into(),
            confidence,
        }
    }

    /// `Column → Caption (NN%)`, the form used in summaries.
    #[must_use]
    pub fn describe(&self) -> String {
        format!(
            "{} → {} ({:.0}%)",
            self.csv_column,
            self.target_caption,
            self.confidence * 100.0
        )
    }
}

/// Why the provider is being called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    /// Suggestions right after a file is loaded.
    InitialSuggestions,
    /// A free-text message from the user.
    Message,
}

/// Request body POSTed to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub csv_columns: Vec<String>,
    pub captions: Vec<String>,
    /// Column → caption for every currently assigned slot.
    pub current_mappings: BTreeMap<String, String>,
    pub request_type: RequestType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response body returned by the provider.
///
/// Nothing in here is trusted until checked against the known columns and
/// captions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResponse {
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_suggestion: Option<MatchCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_suggestions: Option<Vec<MatchCandidate>>,
}

impl SuggestionResponse {
    /// All carried candidates: the list when present, otherwise the single
    /// suggestion.
    #[must_use]
    pub fn into_candidates(self) -> Vec<MatchCandidate> {
        match (self.mapping_suggestions, self.mapping_suggestion) {
            (Some(list), _) => list,
            (None, Some(single)) => vec![single],
            (None, None) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_provider_field_names() {
        let request = SuggestionRequest {
            csv_columns: vec!["Mail".to_string()],
            captions: vec!["Email".to_string()],
            current_mappings: BTreeMap::new(),
            request_type: RequestType::InitialSuggestions,
            message: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["csvColumns"][0], "Mail");
        assert_eq!(json["requestType"], "initial_suggestions");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn response_prefers_suggestion_list() {
        let response: SuggestionResponse = serde_json::from_str(
            r#"{
                "content": "ok",
                "mappingSuggestion": {"csvColumn": "A", "targetCaption": "Email", "confidence": 0.7},
                "mappingSuggestions": [
                    {"csvColumn": "B", "targetCaption": "Phone", "confidence": 0.8}
                ]
            }"#,
        )
        .unwrap();
        let candidates = response.into_candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].csv_column, "B");
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let response: SuggestionResponse = serde_json::from_str("{}").unwrap();
        assert!(response.into_candidates().is_empty());
    }
}
