//! Validation over confirmed mappings.

use importmap_model::{CaptionSlot, DateFormat, ImportColumn, ImportTable, ValidationIssue};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ValidateError;
use crate::rules::FieldRule;

/// Issues found in the mapped columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// One entry per caption with at least one failing value, in slot order.
    pub issues: Vec<ValidationIssue>,
    /// Captions that had a check.
    pub checked: Vec<String>,
    /// Date format `Start Date` was checked against.
    pub date_format: DateFormat,
}

impl ValidationReport {
    /// True when nothing failed.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Failing values across all captions.
    pub fn bad_values(&self) -> usize {
        self.issues.iter().map(|i| i.count).sum()
    }

    /// Issue for a caption, compared ignoring case.
    pub fn issue(&self, caption: &str) -> Option<&ValidationIssue> {
        let key = importmap_model::caption_key(caption);
        self.issues
            .iter()
            .find(|i| importmap_model::caption_key(&i.caption) == key)
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        match self.issues.len() {
            0 => format!("No issues found in {} checked captions", self.checked.len()),
            1 => "1 issue found".to_string(),
            n => format!("{n} issues found"),
        }
    }
}

/// Check every mapped column whose caption has a rule.
///
/// Fails unless every non-blank slot is confirmed. Empty values pass. Row
/// numbers in the report are as shown to the user, counting the header row.
pub fn validate(
    slots: &[CaptionSlot],
    table: &ImportTable,
    columns: &[ImportColumn],
    date_format: DateFormat,
) -> Result<ValidationReport, ValidateError> {
    let active: Vec<&CaptionSlot> = slots.iter().filter(|s| !s.is_blank()).collect();
    let confirmed = active.iter().filter(|s| s.confirmed).count();
    if active.is_empty() || confirmed != active.len() {
        return Err(ValidateError::Unconfirmed {
            confirmed,
            total: active.len(),
        });
    }

    let mut ordered = active;
    ordered.sort_by_key(|s| s.order);

    let mut report = ValidationReport {
        issues: Vec::new(),
        checked: Vec::new(),
        date_format,
    };
    for slot in ordered {
        let Some(rule) = FieldRule::for_caption(&slot.caption, date_format) else {
            continue;
        };
        let Some(column) = slot
            .column
            .as_deref()
            .and_then(|name| columns.iter().find(|c| c.name == name))
        else {
            continue;
        };

        report.checked.push(slot.caption.clone());
        let mut issue = ValidationIssue::new(slot.caption.clone(), rule.description(&slot.caption));
        for (idx, row) in table.data_rows().iter().enumerate() {
            let value = row.get(column.index).map_or("", |v| v.trim());
            if !rule.accepts(value) {
                issue.record(table.display_row(idx), value);
            }
        }

        debug!(caption = %slot.caption, column = %column.name, bad = issue.count, "Checked column");
        if issue.count > 0 {
            report.issues.push(issue);
        }
    }

    info!(
        checked = report.checked.len(),
        issues = report.issues.len(),
        "Validation complete"
    );
    Ok(report)
}
