//! Data model shared by the import mapping crates.
//!
//! Everything here is plain data: parsed tables, inferred columns, caption
//! slots, match candidates, validation issues and the JSON contract spoken
//! with a remote suggestion provider.

pub mod caption;
pub mod column;
pub mod error;
pub mod issue;
pub mod options;
pub mod provider;
pub mod table;

pub use caption::{CaptionSlot, DEFAULT_CAPTIONS, KNOWN_CAPTIONS, caption_key};
pub use column::{ColumnType, ImportColumn};
pub use error::{ExportBlocked, InputFormatError};
pub use issue::{IssueSample, MAX_ISSUE_SAMPLES, ValidationIssue};
pub use options::{DateFormat, Delimiter, ImportOptions};
pub use provider::{MatchCandidate, RequestType, SuggestionRequest, SuggestionResponse};
pub use table::ImportTable;
