//! Remote suggestion provider.
//!
//! The provider is an HTTP endpoint that receives the column and caption
//! lists as JSON and answers with candidate mappings. Its answers are merged
//! with the heuristic ones; when it fails the heuristic result is used alone.

use std::thread;
use std::time::Duration;

use importmap_model::{
    ImportColumn, MatchCandidate, RequestType, SuggestionRequest, SuggestionResponse, caption_key,
};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use thiserror::Error;
use tracing::{debug, warn};

use crate::engine::{MatchingEngine, SuggestionSet, merge_candidates};
use crate::state::MappingState;
use crate::versioned::Versioned;

/// Default HTTP request timeout.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the suggestion provider.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SuggestionProviderError {
    /// Request could not be sent or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// No answer within the timeout.
    #[error("provider request timed out")]
    Timeout,

    /// Non-success HTTP status.
    #[error("provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not a valid suggestion response.
    #[error("invalid provider response: {0}")]
    Decode(String),
}

impl SuggestionProviderError {
    /// Short message for terminal output.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Network(_) => "Could not reach the suggestion service.",
            Self::Timeout => "The suggestion service did not answer in time.",
            Self::Status { .. } => "The suggestion service reported an error.",
            Self::Decode(_) => "The suggestion service sent an unreadable answer.",
        }
    }
}

impl From<reqwest::Error> for SuggestionProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// Source of remote suggestions.
pub trait SuggestionProvider: Send + Sync {
    /// Send one request and return the raw response.
    fn fetch(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, SuggestionProviderError>;
}

/// Provider speaking JSON over HTTP POST.
#[derive(Debug, Clone)]
pub struct HttpSuggestionProvider {
    client: Client,
    endpoint: String,
}

impl HttpSuggestionProvider {
    /// Create a provider for `endpoint` with a request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SuggestionProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SuggestionProvider for HttpSuggestionProvider {
    fn fetch(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, SuggestionProviderError> {
        debug!(endpoint = %self.endpoint, request_type = ?request.request_type, "Requesting suggestions");

        let response = self
            .client
            .post(&self.endpoint)
            .header(USER_AGENT, format!("importmap/{}", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(request).map_err(|e| SuggestionProviderError::Decode(e.to_string()))?)
            .send()?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SuggestionProviderError::Status { status, message });
        }

        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| SuggestionProviderError::Decode(e.to_string()))
    }
}

/// Build a provider request from the current mapping.
pub fn build_request(
    state: &MappingState,
    columns: &[ImportColumn],
    request_type: RequestType,
    message: Option<String>,
) -> SuggestionRequest {
    SuggestionRequest {
        csv_columns: columns.iter().map(|c| c.name.clone()).collect(),
        captions: state.captions(),
        current_mappings: state.current_mappings(),
        request_type,
        message,
    }
}

/// Drop candidates naming an unknown column or caption, or carrying a
/// confidence outside `[0, 1]`.
///
/// Captions are matched ignoring case and padding and rewritten to the known
/// spelling.
pub fn validate_candidates(
    candidates: Vec<MatchCandidate>,
    columns: &[ImportColumn],
    captions: &[String],
) -> Vec<MatchCandidate> {
    candidates
        .into_iter()
        .filter_map(|mut candidate| {
            let confidence_ok =
                candidate.confidence.is_finite() && (0.0..=1.0).contains(&candidate.confidence);
            let column_ok = columns.iter().any(|c| c.name == candidate.csv_column);
            let key = caption_key(&candidate.target_caption);
            let caption = captions
                .iter()
                .find(|c| !key.is_empty() && caption_key(c) == key);

            match caption {
                Some(caption) if confidence_ok && column_ok => {
                    candidate.target_caption.clone_from(caption);
                    Some(candidate)
                }
                _ => {
                    warn!(
                        column = %candidate.csv_column,
                        caption = %candidate.target_caption,
                        confidence = candidate.confidence,
                        "Discarding invalid provider suggestion"
                    );
                    None
                }
            }
        })
        .collect()
}

/// Result of [`gather_suggestions`].
#[derive(Debug)]
pub struct GatheredSuggestions {
    /// Classified suggestions stamped with the state version they were
    /// computed from.
    pub suggestions: Versioned<SuggestionSet>,
    /// Set when the provider was asked and failed.
    pub provider_error: Option<SuggestionProviderError>,
}

/// Compute initial suggestions for a freshly loaded file.
///
/// The provider request runs on a scoped thread while the heuristic runs on
/// the caller's. Provider candidates are validated and merged with the
/// heuristic ones; if the provider fails the heuristic result stands alone.
pub fn gather_suggestions(
    engine: &MatchingEngine,
    provider: Option<&dyn SuggestionProvider>,
    state: &MappingState,
    columns: &[ImportColumn],
) -> GatheredSuggestions {
    let captions = state.captions();

    let (heuristic, remote) = match provider {
        Some(provider) => {
            let request = build_request(state, columns, RequestType::InitialSuggestions, None);
            thread::scope(|scope| {
                let handle = scope.spawn(|| provider.fetch(&request));
                let heuristic = engine.compute_suggestions(columns, &captions);
                let remote = handle.join().unwrap_or_else(|_| {
                    Err(SuggestionProviderError::Network("provider thread panicked".to_string()))
                });
                (heuristic, Some(remote))
            })
        }
        None => (engine.compute_suggestions(columns, &captions), None),
    };

    let (remote_candidates, provider_error) = match remote {
        Some(Ok(response)) => (
            validate_candidates(response.into_candidates(), columns, &captions),
            None,
        ),
        Some(Err(err)) => {
            warn!(error = %err, "Suggestion provider failed, using heuristic suggestions");
            (Vec::new(), Some(err))
        }
        None => (Vec::new(), None),
    };

    debug!(
        heuristic = heuristic.len(),
        remote = remote_candidates.len(),
        "Merging suggestions"
    );
    let merged = merge_candidates(heuristic, remote_candidates);
    GatheredSuggestions {
        suggestions: state.stamp(engine.split(merged)),
        provider_error,
    }
}

/// Send a free-text message to the provider.
///
/// Returns the provider's reply text and its validated candidates.
pub fn send_message(
    provider: &dyn SuggestionProvider,
    state: &MappingState,
    columns: &[ImportColumn],
    message: &str,
) -> Result<(String, Vec<MatchCandidate>), SuggestionProviderError> {
    let request = build_request(
        state,
        columns,
        RequestType::Message,
        Some(message.to_string()),
    );
    let mut response = provider.fetch(&request)?;
    let content = std::mem::take(&mut response.content);
    let candidates = validate_candidates(response.into_candidates(), columns, &state.captions());
    Ok((content, candidates))
}

#[cfg(test)]
mod tests {
    use importmap_model::ColumnType;

    use super::*;

    fn column(name: &str, index: usize) -> ImportColumn {
        ImportColumn {
            name: name.to_string(),
            index,
            sample: Vec::new(),
            column_type: ColumnType::Text,
        }
    }

    #[test]
    fn test_validate_drops_unknown_and_out_of_range() {
        let columns = vec![column("Mail", 0), column("Dept", 1)];
        let captions = vec!["Email".to_string(), "Org Unit".to_string()];
        let kept = validate_candidates(
            vec![
                MatchCandidate::new("Mail", " email", 0.9),
                MatchCandidate::new("Nope", "Email", 0.9),
                MatchCandidate::new("Dept", "Salary", 0.9),
                MatchCandidate::new("Dept", "Org Unit", 1.5),
                MatchCandidate::new("Dept", "Org Unit", f32::NAN),
            ],
            &columns,
            &captions,
        );
        assert_eq!(kept, vec![MatchCandidate::new("Mail", "Email", 0.9)]);
    }

    #[test]
    fn test_user_messages() {
        assert!(SuggestionProviderError::Timeout.user_message().contains("in time"));
        let err = SuggestionProviderError::Status {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "provider returned HTTP 502: bad gateway");
    }
}
