//! One import session: a loaded file, its mapping state and validation.
//!
//! The session owns the [`MappingState`] exclusively. Every step takes
//! `&mut self` and runs to completion, so suggestions fetched for one file
//! can never be applied over edits made afterwards.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use importmap_ingest::{analyze_table, read_import_file};
use importmap_map::{
    ApplyOutcome, CaptionScore, ExportError, HttpSuggestionProvider, MappingState, MatchingEngine,
    SuggestionProvider, SuggestionProviderError, export, export_file_name, gather_suggestions,
    send_message,
};
use importmap_model::{ImportColumn, ImportOptions, ImportTable, MatchCandidate};
use importmap_validate::{Correction, ValidationReport, apply_correction, validate};
use tracing::{debug, info, info_span, warn};

use crate::config::Config;
use crate::logging::redact_value;

/// What happened when a file was loaded.
#[derive(Debug)]
pub struct UploadSummary {
    pub rows: usize,
    pub outcome: ApplyOutcome,
    /// Set when the provider was asked and failed; heuristics were used.
    pub provider_error: Option<SuggestionProviderError>,
}

/// The provider's answer to a message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageReply {
    pub content: String,
    /// Candidates applied as confirmations.
    pub applied: Vec<MatchCandidate>,
    /// Candidates that could not be applied, with the reason.
    pub rejected: Vec<(MatchCandidate, String)>,
    /// Set when the provider failed; nothing was applied.
    pub provider_error: Option<SuggestionProviderError>,
}

/// Pipeline state for one invocation.
pub struct ImportSession {
    engine: MatchingEngine,
    provider: Option<Box<dyn SuggestionProvider>>,
    options: ImportOptions,
    state: MappingState,
    table: Option<ImportTable>,
    columns: Vec<ImportColumn>,
    source: Option<PathBuf>,
    report: Option<ValidationReport>,
}

impl ImportSession {
    /// Build a session from configuration.
    ///
    /// An HTTP provider is created when `[provider] endpoint` is set.
    pub fn new(config: &Config) -> Result<Self> {
        let engine = config.engine().context("invalid [matching] thresholds")?;
        let state = config.mapping_state().context("invalid [captions] list")?;
        let provider = match &config.provider.endpoint {
            Some(endpoint) => {
                let provider = HttpSuggestionProvider::new(endpoint.clone(), config.provider.timeout())
                    .context("create suggestion provider")?;
                Some(Box::new(provider) as Box<dyn SuggestionProvider>)
            }
            None => None,
        };
        Ok(Self {
            engine,
            provider,
            options: config.import,
            state,
            table: None,
            columns: Vec::new(),
            source: None,
            report: None,
        })
    }

    /// Replace the suggestion provider.
    #[must_use]
    pub fn with_provider(mut self, provider: Option<Box<dyn SuggestionProvider>>) -> Self {
        self.provider = provider;
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }

    pub fn state(&self) -> &MappingState {
        &self.state
    }

    /// Caption edits go straight to the state; they invalidate any report.
    pub fn state_mut(&mut self) -> &mut MappingState {
        self.report = None;
        &mut self.state
    }

    pub fn columns(&self) -> &[ImportColumn] {
        &self.columns
    }

    pub fn table(&self) -> Option<&ImportTable> {
        self.table.as_ref()
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Read a file and apply suggestions for it.
    pub fn load_file(&mut self, path: &Path) -> Result<UploadSummary> {
        let span = info_span!("load", path = %path.display());
        let _guard = span.enter();
        let table = read_import_file(path, &self.options)
            .with_context(|| format!("read {}", path.display()))?;
        self.source = Some(path.to_path_buf());
        self.load_table(table)
    }

    /// Apply suggestions for an already parsed table.
    ///
    /// Unconfirmed slots are reset; certain suggestions are applied and
    /// confirmed, uncertain ones are offered for confirmation.
    pub fn load_table(&mut self, table: ImportTable) -> Result<UploadSummary> {
        let columns = analyze_table(&table);
        info!(
            columns = columns.len(),
            rows = table.data_len(),
            "Loaded import table"
        );

        let gathered = gather_suggestions(
            &self.engine,
            self.provider.as_deref(),
            &self.state,
            &columns,
        );
        let outcome = self.state.apply_suggestions(gathered.suggestions, &columns)?;
        for candidate in &outcome.applied {
            debug!(mapping = %candidate.describe(), "Auto-applied");
        }

        let rows = table.data_len();
        self.columns = columns;
        self.table = Some(table);
        self.report = None;
        Ok(UploadSummary {
            rows,
            outcome,
            provider_error: gathered.provider_error,
        })
    }

    /// Confirm `column` for `caption`.
    pub fn confirm(&mut self, column: &str, caption: &str) -> Result<()> {
        self.require_table()?;
        self.state
            .confirm_mapping(column, caption, None, &self.columns)?;
        self.report = None;
        Ok(())
    }

    /// Accept the pending suggestion of one caption.
    pub fn accept(&mut self, caption: &str) -> Result<()> {
        self.state.accept_suggestion(caption)?;
        self.report = None;
        Ok(())
    }

    /// Accept every pending suggestion.
    pub fn accept_all(&mut self) -> Vec<String> {
        let accepted = self.state.accept_all_suggestions();
        if !accepted.is_empty() {
            self.report = None;
        }
        accepted
    }

    /// Send a free-text message to the provider.
    ///
    /// Each valid candidate in the reply is applied as a confirmation. A
    /// provider failure is reported in the reply and leaves the state as is.
    pub fn send_message(&mut self, message: &str) -> Result<MessageReply> {
        self.require_table()?;
        let provider = self
            .provider
            .as_deref()
            .ok_or_else(|| anyhow!("no suggestion provider configured"))?;
        let (content, candidates) = match send_message(provider, &self.state, &self.columns, message) {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, "Suggestion provider failed to answer a message");
                return Ok(MessageReply {
                    content: error.user_message().to_string(),
                    applied: Vec::new(),
                    rejected: Vec::new(),
                    provider_error: Some(error),
                });
            }
        };

        let mut applied = Vec::new();
        let mut rejected = Vec::new();
        for candidate in candidates {
            match self.state.confirm_mapping(
                &candidate.csv_column,
                &candidate.target_caption,
                Some(candidate.confidence),
                &self.columns,
            ) {
                Ok(()) => applied.push(candidate),
                Err(error) => {
                    warn!(mapping = %candidate.describe(), %error, "Provider mapping not applied");
                    rejected.push((candidate, error.to_string()));
                }
            }
        }
        if !applied.is_empty() {
            self.report = None;
        }
        Ok(MessageReply {
            content,
            applied,
            rejected,
            provider_error: None,
        })
    }

    /// Validate the mapped values. Requires every caption confirmed.
    pub fn validate(&mut self) -> Result<&ValidationReport> {
        let table = self.require_table()?;
        let report = validate(
            self.state.slots(),
            table,
            &self.columns,
            self.options.date_format,
        )?;
        Ok(self.report.insert(report))
    }

    /// Rewrite one cell and re-check it.
    ///
    /// Validates first when no report exists yet.
    pub fn fix(&mut self, row: usize, caption: &str, value: &str) -> Result<Correction> {
        if self.report.is_none() {
            self.validate()?;
        }
        let (Some(table), Some(report)) = (self.table.as_mut(), self.report.as_mut()) else {
            bail!("no file loaded");
        };
        let correction = apply_correction(
            table,
            self.state.slots(),
            &self.columns,
            caption,
            row,
            value,
            report,
        )?;
        self.state
            .refresh_sample(&correction.caption, table, &self.columns)?;
        info!(
            caption = %correction.caption,
            row,
            previous = %redact_value(&correction.previous),
            value = %redact_value(&correction.value),
            "Applied correction"
        );
        Ok(correction)
    }

    /// Score one column against one caption, with the breakdown.
    pub fn explain(&self, column: &ImportColumn, caption: &str) -> CaptionScore {
        self.engine.explain(column, caption)
    }

    /// The mapped table as delimited text.
    pub fn export(&self) -> Result<String, ExportError> {
        let empty = ImportTable::default();
        let table = self.table.as_ref().unwrap_or(&empty);
        export(&self.state, table, &self.columns, self.options.delimiter)
    }

    /// Default output file name for the loaded file.
    pub fn export_file_name(&self) -> String {
        export_file_name(self.source.as_deref(), self.options.delimiter)
    }

    fn require_table(&self) -> Result<&ImportTable> {
        self.table.as_ref().ok_or_else(|| anyhow!("no file loaded"))
    }
}
