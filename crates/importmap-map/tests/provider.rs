//! Provider merge and fallback.

use std::sync::atomic::{AtomicUsize, Ordering};

use importmap_map::{
    MappingState, MatchingEngine, SuggestionProvider, SuggestionProviderError, gather_suggestions,
    send_message,
};
use importmap_model::{
    ColumnType, ImportColumn, MatchCandidate, RequestType, SuggestionRequest, SuggestionResponse,
};

struct FixedProvider {
    response: Result<SuggestionResponse, SuggestionProviderError>,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn answering(candidates: Vec<MatchCandidate>) -> Self {
        Self {
            response: Ok(SuggestionResponse {
                content: "Here are my suggestions.".to_string(),
                mapping_suggestion: None,
                mapping_suggestions: Some(candidates),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(err: SuggestionProviderError) -> Self {
        Self {
            response: Err(err),
            calls: AtomicUsize::new(0),
        }
    }
}

impl SuggestionProvider for FixedProvider {
    fn fetch(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, SuggestionProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!request.captions.is_empty());
        self.response.clone()
    }
}

fn columns(names: &[&str]) -> Vec<ImportColumn> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| ImportColumn {
            name: (*name).to_string(),
            index,
            sample: Vec::new(),
            column_type: ColumnType::Text,
        })
        .collect()
}

#[test]
fn provider_failure_falls_back_to_heuristics() {
    let columns = columns(&["Surname", "Cost Code"]);
    let state = MappingState::default();
    let engine = MatchingEngine::default();
    let provider = FixedProvider::failing(SuggestionProviderError::Timeout);

    let gathered = gather_suggestions(&engine, Some(&provider as &dyn SuggestionProvider), &state, &columns);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(gathered.provider_error, Some(SuggestionProviderError::Timeout));
    assert_eq!(
        gathered.suggestions.data.certain,
        vec![MatchCandidate::new("Surname", "Surname", 1.0)]
    );
    assert!(gathered.suggestions.is_current(state.version()));
}

#[test]
fn provider_candidates_are_validated_and_merged() {
    let columns = columns(&["Surname", "Cost Code"]);
    let state = MappingState::default();
    let engine = MatchingEngine::default();
    let provider = FixedProvider::answering(vec![
        MatchCandidate::new("Cost Code", "org unit", 0.85),
        MatchCandidate::new("Cost Code", "Salary Band", 0.9),
        MatchCandidate::new("Surname", "Surname", 0.4),
    ]);

    let gathered = gather_suggestions(&engine, Some(&provider as &dyn SuggestionProvider), &state, &columns);
    assert!(gathered.provider_error.is_none());
    let set = gathered.suggestions.data;
    assert_eq!(set.certain, vec![MatchCandidate::new("Surname", "Surname", 1.0)]);
    assert_eq!(set.uncertain, vec![MatchCandidate::new("Cost Code", "Org Unit", 0.85)]);
}

#[test]
fn message_reply_carries_validated_candidates() {
    let columns = columns(&["Mail"]);
    let state = MappingState::default();
    let provider = FixedProvider {
        response: Ok(SuggestionResponse {
            content: "Mapped Mail to Email.".to_string(),
            mapping_suggestion: Some(MatchCandidate::new("Mail", "Email", 0.9)),
            mapping_suggestions: None,
        }),
        calls: AtomicUsize::new(0),
    };

    let (content, candidates) = send_message(&provider, &state, &columns, "map mail to email").unwrap();
    assert_eq!(content, "Mapped Mail to Email.");
    assert_eq!(candidates, vec![MatchCandidate::new("Mail", "Email", 0.9)]);
}

#[test]
fn message_request_is_tagged() {
    let columns = columns(&["Mail"]);
    let state = MappingState::default();
    let request = importmap_map::build_request(
        &state,
        &columns,
        RequestType::Message,
        Some("hello".to_string()),
    );
    assert_eq!(request.request_type, RequestType::Message);
    assert_eq!(request.captions.len(), 7);
    assert!(request.current_mappings.is_empty());
}
