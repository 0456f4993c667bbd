//! Caption slots: the target fields import columns are mapped onto.

use serde::{Deserialize, Serialize};

/// Captions seeded into a fresh mapping, in display/export order.
pub const DEFAULT_CAPTIONS: &[&str] = &[
    "Reference",
    "Org Unit",
    "Forename(s)",
    "Surname",
    "Email",
    "Job Title",
    "Manager Name",
];

/// Every caption the importer knows how to describe.
pub const KNOWN_CAPTIONS: &[&str] = &[
    "Reference",
    "Org Unit",
    "Forename(s)",
    "Surname",
    "Email",
    "Job Title",
    "Manager Name",
    "Phone",
    "Department",
    "Location",
    "Start Date",
    "Employee ID",
    "First Name",
    "Last Name",
    "Full Name",
    "Username",
    "Role",
    "Status",
];

/// Key under which captions are compared: trimmed and lowercased.
#[must_use]
pub fn caption_key(caption: &str) -> String {
    caption.trim().to_lowercase()
}

/// One target field and whatever import column is currently assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionSlot {
    /// Caption text; unique across the slots of one mapping.
    pub caption: String,
    /// Display and export order.
    pub order: usize,
    /// Assigned import column name, `None` while unassigned.
    pub column: Option<String>,
    /// First sample value of the assigned column.
    pub sample: Option<String>,
    /// Confidence of the assignment, when it came from a suggestion.
    pub confidence: Option<f32>,
    /// The assignment came from a suggestion.
    pub suggested: bool,
    /// The assignment has been auto-applied or explicitly confirmed.
    pub confirmed: bool,
    /// Consumed by the downstream importer to establish record identity.
    pub key_field: bool,
    /// Consumed by the downstream importer to match existing records by id.
    pub match_by_id: bool,
}

impl CaptionSlot {
    /// Create an unassigned slot.
    #[must_use]
    pub fn new(caption: impl Into<String>, order: usize) -> Self {
        Self {
            caption: caption.into(),
            order,
            column: None,
            sample: None,
            confidence: None,
            suggested: false,
            confirmed: false,
            key_field: false,
            match_by_id: false,
        }
    }

    /// Builder-style key field flags.
    #[must_use]
    pub fn with_identity(mut self, key_field: bool, match_by_id: bool) -> Self {
        self.key_field = key_field;
        self.match_by_id = match_by_id;
        self
    }

    /// The default slot list.
    ///
    /// `Reference` is the key field and is matched by id.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        DEFAULT_CAPTIONS
            .iter()
            .enumerate()
            .map(|(order, caption)| {
                let identity = *caption == "Reference";
                Self::new(*caption, order).with_identity(identity, identity)
            })
            .collect()
    }

    /// True when the caption text is blank. Blank slots take no part in
    /// matching, validation or export.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.caption.trim().is_empty()
    }

    /// True when a column is assigned.
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.column.is_some()
    }

    /// Drop the assignment and all suggestion state.
    pub fn clear(&mut self) {
        self.column = None;
        self.sample = None;
        self.confidence = None;
        self.suggested = false;
        self.confirmed = false;
    }

    /// True when this slot carries the given caption (see [`caption_key`]).
    #[must_use]
    pub fn has_caption(&self, caption: &str) -> bool {
        !self.is_blank() && caption_key(&self.caption) == caption_key(caption)
    }

    /// Column shown in tables, `N/A` when unassigned.
    #[must_use]
    pub fn column_label(&self) -> &str {
        self.column.as_deref().unwrap_or("N/A")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mark_reference_as_key() {
        let slots = CaptionSlot::defaults();
        assert_eq!(slots.len(), 7);
        assert!(slots[0].key_field && slots[0].match_by_id);
        assert!(slots[1..].iter().all(|s| !s.key_field && !s.match_by_id));
        assert_eq!(slots[6].order, 6);
    }

    #[test]
    fn caption_comparison_ignores_case_and_padding() {
        let slot = CaptionSlot::new("Job Title", 0);
        assert!(slot.has_caption("  job title "));
        assert!(!slot.has_caption("Job"));
        assert!(!CaptionSlot::new(" ", 1).has_caption(" "));
    }

    #[test]
    fn clear_resets_confirmation() {
        let mut slot = CaptionSlot::new("Email", 0);
        slot.column = Some("Mail".to_string());
        slot.confirmed = true;
        slot.clear();
        assert!(!slot.is_assigned());
        assert!(!slot.confirmed);
        assert_eq!(slot.column_label(), "N/A");
    }
}
