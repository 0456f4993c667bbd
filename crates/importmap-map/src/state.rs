//! Mapping state: the caption slots of one import session.
//!
//! Every operation runs to completion on `&mut self` and bumps the version,
//! so results computed against an earlier state can be recognised and
//! refused.

use std::collections::BTreeMap;

use importmap_model::{
    CaptionSlot, ImportColumn, ImportTable, MatchCandidate, caption_key,
};

use crate::engine::SuggestionSet;
use crate::error::MappingError;
use crate::versioned::Versioned;

/// Caption slots plus a version counter.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingState {
    slots: Vec<CaptionSlot>,
    version: u64,
}

impl Default for MappingState {
    fn default() -> Self {
        Self {
            slots: CaptionSlot::defaults(),
            version: 0,
        }
    }
}

/// What [`MappingState::apply_suggestions`] did with each candidate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyOutcome {
    /// Applied and confirmed.
    pub applied: Vec<MatchCandidate>,
    /// Shown as suggestions awaiting confirmation.
    pub suggested: Vec<MatchCandidate>,
    /// Not applied: unknown caption or column, column held elsewhere, or a
    /// suggestion for an already confirmed slot.
    pub skipped: Vec<MatchCandidate>,
    /// Captions whose confirmed column is missing from the new file.
    pub reset: Vec<String>,
}

/// Summary of slot counts over non-blank captions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingSummary {
    /// Non-blank slots.
    pub total: usize,
    /// Slots confirmed by auto-apply or by the user.
    pub confirmed: usize,
    /// Slots holding a suggestion that awaits confirmation.
    pub suggested: usize,
    /// Slots with no column.
    pub unassigned: usize,
}

impl MappingSummary {
    /// Confirmed share in whole percent.
    #[must_use]
    pub fn coverage_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.confirmed as f64 / self.total as f64) * 100.0).round() as u32
    }
}

impl MappingState {
    /// State over the given slots.
    ///
    /// Fails when two non-blank slots share a caption. Slot order is taken
    /// from the vector and `order` fields are renumbered.
    pub fn new(slots: Vec<CaptionSlot>) -> Result<Self, MappingError> {
        for (idx, slot) in slots.iter().enumerate() {
            if slots[..idx].iter().any(|s| s.has_caption(&slot.caption)) {
                return Err(MappingError::DuplicateCaption {
                    caption: slot.caption.clone(),
                });
            }
        }
        let mut state = Self { slots, version: 0 };
        state.renumber();
        Ok(state)
    }

    /// Unassigned slots for the given captions, in order.
    pub fn from_captions<S: AsRef<str>>(captions: &[S]) -> Result<Self, MappingError> {
        Self::new(
            captions
                .iter()
                .enumerate()
                .map(|(order, caption)| CaptionSlot::new(caption.as_ref().trim(), order))
                .collect(),
        )
    }

    /// Current version. Starts at 0 and grows with every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Stamp data with the current version.
    pub fn stamp<T>(&self, data: T) -> Versioned<T> {
        Versioned::new(data, self.version)
    }

    /// All slots in display order, blanks included.
    pub fn slots(&self) -> &[CaptionSlot] {
        &self.slots
    }

    /// Slot carrying a caption.
    pub fn slot(&self, caption: &str) -> Option<&CaptionSlot> {
        self.slots.iter().find(|s| s.has_caption(caption))
    }

    /// Non-blank captions in order.
    pub fn captions(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| !s.is_blank())
            .map(|s| s.caption.clone())
            .collect()
    }

    // === Operations ===

    /// Apply a classified suggestion set for a freshly loaded file.
    ///
    /// Unconfirmed slots are cleared first, as are confirmed slots whose
    /// column is not in `columns`. Certain candidates are then applied and
    /// confirmed; uncertain ones fill only unconfirmed slots. A candidate is
    /// skipped when its column is already held by another slot.
    pub fn apply_suggestions(
        &mut self,
        suggestions: Versioned<SuggestionSet>,
        columns: &[ImportColumn],
    ) -> Result<ApplyOutcome, MappingError> {
        if suggestions.is_stale(self.version) {
            return Err(MappingError::StaleSuggestions {
                computed: suggestions.source_version,
                current: self.version,
            });
        }

        let mut outcome = ApplyOutcome::default();
        for slot in &mut self.slots {
            if !slot.confirmed {
                slot.clear();
                continue;
            }
            let kept = slot
                .column
                .as_deref()
                .and_then(|name| columns.iter().find(|c| c.name == name));
            match kept {
                Some(column) => slot.sample = column.first_sample().map(str::to_string),
                None => {
                    tracing::warn!(caption = %slot.caption, "Confirmed column missing from new file");
                    outcome.reset.push(slot.caption.clone());
                    slot.clear();
                }
            }
        }

        let SuggestionSet { certain, uncertain } = suggestions.data;
        for candidate in certain {
            if self.place(&candidate, columns, true) {
                outcome.applied.push(candidate);
            } else {
                outcome.skipped.push(candidate);
            }
        }
        for candidate in uncertain {
            if self.place(&candidate, columns, false) {
                outcome.suggested.push(candidate);
            } else {
                outcome.skipped.push(candidate);
            }
        }

        tracing::debug!(
            applied = outcome.applied.len(),
            suggested = outcome.suggested.len(),
            skipped = outcome.skipped.len(),
            "Applied suggestions"
        );
        self.bump();
        Ok(outcome)
    }

    fn place(&mut self, candidate: &MatchCandidate, columns: &[ImportColumn], confirm: bool) -> bool {
        let Some(idx) = self.index_of(&candidate.target_caption) else {
            return false;
        };
        let Some(column) = columns.iter().find(|c| c.name == candidate.csv_column) else {
            return false;
        };
        if self.holder_of(&column.name).is_some_and(|holder| holder != idx) {
            return false;
        }
        let slot = &mut self.slots[idx];
        if !confirm && slot.confirmed {
            return false;
        }
        slot.column = Some(column.name.clone());
        slot.sample = column.first_sample().map(str::to_string);
        slot.confidence = Some(candidate.confidence);
        slot.suggested = true;
        slot.confirmed = confirm;
        true
    }

    /// Confirm the pending suggestion of a slot. Confirming an already
    /// confirmed slot is a no-op.
    pub fn accept_suggestion(&mut self, caption: &str) -> Result<(), MappingError> {
        let idx = self.position(caption)?;
        let slot = &mut self.slots[idx];
        if slot.confirmed {
            return Ok(());
        }
        if !slot.suggested || !slot.is_assigned() {
            return Err(MappingError::NoSuggestion {
                caption: slot.caption.clone(),
            });
        }
        slot.confirmed = true;
        self.bump();
        Ok(())
    }

    /// Confirm every pending suggestion. Returns the confirmed captions.
    pub fn accept_all_suggestions(&mut self) -> Vec<String> {
        let mut accepted = Vec::new();
        for slot in &mut self.slots {
            if !slot.is_blank() && slot.suggested && slot.is_assigned() && !slot.confirmed {
                slot.confirmed = true;
                accepted.push(slot.caption.clone());
            }
        }
        if !accepted.is_empty() {
            self.bump();
        }
        accepted
    }

    /// Assign a column to a caption and confirm it.
    ///
    /// An unconfirmed slot holding the column loses it; a confirmed one makes
    /// this fail with [`MappingError::ColumnAlreadyUsed`]. `confidence` is set
    /// when the confirmation came from a suggestion.
    pub fn confirm_mapping(
        &mut self,
        column: &str,
        caption: &str,
        confidence: Option<f32>,
        columns: &[ImportColumn],
    ) -> Result<(), MappingError> {
        let idx = self.position(caption)?;
        let column = find_column(column, columns)?;
        self.release_column(&column.name, idx)?;

        let slot = &mut self.slots[idx];
        slot.column = Some(column.name.clone());
        slot.sample = column.first_sample().map(str::to_string);
        slot.confidence = confidence;
        slot.suggested = confidence.is_some();
        slot.confirmed = true;
        self.bump();
        Ok(())
    }

    /// Point a slot at a column without confirming it.
    pub fn assign_column(
        &mut self,
        caption: &str,
        column: &str,
        columns: &[ImportColumn],
    ) -> Result<(), MappingError> {
        let idx = self.position(caption)?;
        let column = find_column(column, columns)?;
        self.release_column(&column.name, idx)?;

        let slot = &mut self.slots[idx];
        slot.clear();
        slot.column = Some(column.name.clone());
        slot.sample = column.first_sample().map(str::to_string);
        self.bump();
        Ok(())
    }

    /// Drop a slot's assignment.
    pub fn clear_assignment(&mut self, caption: &str) -> Result<(), MappingError> {
        let idx = self.position(caption)?;
        self.slots[idx].clear();
        self.bump();
        Ok(())
    }

    /// Rename a caption.
    ///
    /// The assignment is kept but must be confirmed again. Renaming to a
    /// blank caption drops it.
    pub fn rename_caption(&mut self, caption: &str, new_caption: &str) -> Result<(), MappingError> {
        let idx = self.position(caption)?;
        let new_caption = new_caption.trim();
        if let Some(other) = self.index_of(new_caption)
            && other != idx
        {
            return Err(MappingError::DuplicateCaption {
                caption: new_caption.to_string(),
            });
        }

        let slot = &mut self.slots[idx];
        slot.caption = new_caption.to_string();
        if slot.is_blank() {
            slot.clear();
        } else {
            slot.confirmed = false;
        }
        self.bump();
        Ok(())
    }

    /// Append a slot. Returns its index.
    pub fn add_slot(&mut self, caption: &str) -> Result<usize, MappingError> {
        let caption = caption.trim();
        if self.index_of(caption).is_some() {
            return Err(MappingError::DuplicateCaption {
                caption: caption.to_string(),
            });
        }
        let order = self.slots.len();
        self.slots.push(CaptionSlot::new(caption, order));
        self.bump();
        Ok(order)
    }

    /// Remove the slot carrying a caption.
    pub fn remove_slot(&mut self, caption: &str) -> Result<CaptionSlot, MappingError> {
        let idx = self.position(caption)?;
        let removed = self.slots.remove(idx);
        self.renumber();
        self.bump();
        Ok(removed)
    }

    /// Drop every blank slot. Returns how many were removed.
    pub fn remove_blank_slots(&mut self) -> usize {
        let before = self.slots.len();
        self.slots.retain(|s| !s.is_blank());
        let removed = before - self.slots.len();
        if removed > 0 {
            self.renumber();
            self.bump();
        }
        removed
    }

    /// Mark or unmark a slot as the key field.
    pub fn set_key_field(&mut self, caption: &str, key_field: bool) -> Result<(), MappingError> {
        let idx = self.position(caption)?;
        self.slots[idx].key_field = key_field;
        self.bump();
        Ok(())
    }

    /// Mark or unmark a slot for matching existing records by id.
    pub fn set_match_by_id(&mut self, caption: &str, match_by_id: bool) -> Result<(), MappingError> {
        let idx = self.position(caption)?;
        self.slots[idx].match_by_id = match_by_id;
        self.bump();
        Ok(())
    }

    /// Re-read a slot's sample from the table after cells changed.
    ///
    /// The sample becomes the first non-empty value of the assigned column.
    /// Returns the new sample.
    pub fn refresh_sample(
        &mut self,
        caption: &str,
        table: &ImportTable,
        columns: &[ImportColumn],
    ) -> Result<Option<String>, MappingError> {
        let idx = self.position(caption)?;
        let Some(name) = self.slots[idx].column.clone() else {
            return Ok(None);
        };
        let column = find_column(&name, columns)?;
        let sample = table
            .data_rows()
            .iter()
            .filter_map(|row| row.get(column.index))
            .find(|v| !v.is_empty())
            .cloned();
        self.slots[idx].sample.clone_from(&sample);
        self.bump();
        Ok(sample)
    }

    // === Queries ===

    /// Slot counts.
    pub fn summary(&self) -> MappingSummary {
        let active = || self.slots.iter().filter(|s| !s.is_blank());
        MappingSummary {
            total: active().count(),
            confirmed: active().filter(|s| s.confirmed).count(),
            suggested: active()
                .filter(|s| s.suggested && s.is_assigned() && !s.confirmed)
                .count(),
            unassigned: active().filter(|s| !s.is_assigned()).count(),
        }
    }

    /// True when there is at least one caption and all are confirmed.
    pub fn is_complete(&self) -> bool {
        let summary = self.summary();
        summary.total > 0 && summary.confirmed == summary.total
    }

    /// Column → caption for every assigned slot.
    pub fn current_mappings(&self) -> BTreeMap<String, String> {
        self.slots
            .iter()
            .filter(|s| !s.is_blank())
            .filter_map(|s| Some((s.column.clone()?, s.caption.clone())))
            .collect()
    }

    /// `(caption, column)` for confirmed slots in order.
    pub fn confirmed_mappings(&self) -> Vec<(&str, &str)> {
        self.slots
            .iter()
            .filter(|s| !s.is_blank() && s.confirmed)
            .filter_map(|s| Some((s.caption.as_str(), s.column.as_deref()?)))
            .collect()
    }

    /// Header row for export: confirmed captions in slot order.
    pub fn export_headers(&self) -> Vec<String> {
        self.confirmed_mappings()
            .into_iter()
            .map(|(caption, _)| caption.to_string())
            .collect()
    }

    // === Internals ===

    fn bump(&mut self) {
        self.version += 1;
    }

    fn renumber(&mut self) {
        for (order, slot) in self.slots.iter_mut().enumerate() {
            slot.order = order;
        }
    }

    fn index_of(&self, caption: &str) -> Option<usize> {
        if caption_key(caption).is_empty() {
            return None;
        }
        self.slots.iter().position(|s| s.has_caption(caption))
    }

    fn position(&self, caption: &str) -> Result<usize, MappingError> {
        self.index_of(caption)
            .ok_or_else(|| MappingError::CaptionNotFound {
                caption: caption.to_string(),
            })
    }

    fn holder_of(&self, column: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.column.as_deref() == Some(column))
    }

    /// Free `column` for slot `idx`, clearing an unconfirmed holder.
    fn release_column(&mut self, column: &str, idx: usize) -> Result<(), MappingError> {
        match self.holder_of(column) {
            Some(holder) if holder != idx => {
                let other = &mut self.slots[holder];
                if other.confirmed {
                    return Err(MappingError::ColumnAlreadyUsed {
                        column: column.to_string(),
                        caption: other.caption.clone(),
                    });
                }
                other.clear();
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Find a column by exact name, then ignoring case and padding.
fn find_column<'a>(name: &str, columns: &'a [ImportColumn]) -> Result<&'a ImportColumn, MappingError> {
    columns
        .iter()
        .find(|c| c.name == name)
        .or_else(|| {
            let wanted = name.trim();
            columns
                .iter()
                .find(|c| c.name.trim().eq_ignore_ascii_case(wanted))
        })
        .ok_or_else(|| MappingError::column_not_found(name, columns.iter().map(|c| c.name.as_str())))
}
