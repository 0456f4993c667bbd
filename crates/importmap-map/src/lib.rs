//! Caption matching for import files.
//!
//! Scores every (column, caption) pair, picks at most one column per caption
//! and one caption per column, and classifies each pick as certain or
//! uncertain. [`MappingState`] holds the resulting assignments while the user
//! reviews them, and [`export`] writes the mapped table once every caption is
//! confirmed.
//!
//! # Example
//!
//! ```ignore
//! use importmap_map::{MappingState, MatchingEngine};
//!
//! let engine = MatchingEngine::default();
//! let mut state = MappingState::default();
//! let suggestions = state.stamp(engine.suggest(&columns, &state.captions()));
//! let outcome = state.apply_suggestions(suggestions, &columns)?;
//! ```

pub mod engine;
pub mod error;
pub mod export;
pub mod provider;
pub mod score;
pub mod state;
pub mod synonyms;
pub mod versioned;

// === Matching ===
pub use engine::{
    Certainty, ClassifiedCandidate, DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_CERTAINTY_THRESHOLD,
    MatchThresholds, MatchingEngine, SuggestionSet, merge_candidates, resolve_collisions,
};
pub use score::{CaptionScore, ScoreComponent, Scorer, normalize, score};
pub use synonyms::SynonymDictionary;

// === State ===
pub use error::MappingError;
pub use state::{ApplyOutcome, MappingState, MappingSummary};
pub use versioned::Versioned;

// === Provider ===
pub use provider::{
    DEFAULT_PROVIDER_TIMEOUT, GatheredSuggestions, HttpSuggestionProvider, SuggestionProvider,
    SuggestionProviderError, build_request, gather_suggestions, send_message, validate_candidates,
};

// === Export ===
pub use export::{ExportError, export, export_file_name};
