//! Single-cell corrections.

use importmap_model::{CaptionSlot, ImportColumn, ImportTable, IssueSample, ValidationIssue};
use tracing::info;

use crate::error::CorrectionError;
use crate::report::ValidationReport;
use crate::rules::FieldRule;

/// A cell that was rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    /// Caption as spelled on its slot.
    pub caption: String,
    /// Column that was written.
    pub column: String,
    /// 1-based row number as shown to the user.
    pub row: usize,
    pub previous: String,
    pub value: String,
    /// The new value passes the caption's check (always true without one).
    pub passes: bool,
}

impl Correction {
    /// Message shown after the fix.
    pub fn message(&self) -> String {
        format!(
            "Fixed: Updated {} in row {} from \"{}\" to \"{}\"",
            self.caption, self.row, self.previous, self.value
        )
    }
}

/// Rewrite one cell of a caption's mapped column and re-check it.
///
/// Only the corrected row is re-checked. When the old value failed and the
/// new one passes, its sample is dropped and the issue count decremented; when
/// both fail, the sample value is replaced. The slot's displayed sample must
/// be refreshed by the caller.
pub fn apply_correction(
    table: &mut ImportTable,
    slots: &[CaptionSlot],
    columns: &[ImportColumn],
    caption: &str,
    row_number: usize,
    new_value: &str,
    report: &mut ValidationReport,
) -> Result<Correction, CorrectionError> {
    let slot = slots
        .iter()
        .find(|s| s.has_caption(caption))
        .ok_or_else(|| CorrectionError::CaptionNotFound {
            caption: caption.to_string(),
        })?;
    let column_name = slot
        .column
        .as_deref()
        .ok_or_else(|| CorrectionError::Unassigned {
            caption: slot.caption.clone(),
        })?;
    let column = columns
        .iter()
        .find(|c| c.name == column_name)
        .ok_or_else(|| CorrectionError::ColumnMissing {
            column: column_name.to_string(),
        })?;
    let data_index = table
        .data_index(row_number)
        .ok_or_else(|| CorrectionError::RowOutOfRange {
            row: row_number,
            first: table.display_row(0),
            last: table.display_row(table.data_len().saturating_sub(1)),
        })?;

    let value = new_value.trim().to_string();
    let previous = table
        .set_cell(data_index, column.index, value.clone())
        .unwrap_or_default();

    let rule = FieldRule::for_caption(&slot.caption, report.date_format);
    let passes = rule.is_none_or(|r| r.accepts(&value));
    if let Some(rule) = rule {
        let failed_before = !rule.accepts(&previous);
        update_issue(report, &slot.caption, rule, row_number, failed_before, &value, passes);
    }

    info!(
        caption = %slot.caption,
        row = row_number,
        passes,
        "Corrected cell"
    );
    Ok(Correction {
        caption: slot.caption.clone(),
        column: column.name.clone(),
        row: row_number,
        previous: previous.trim().to_string(),
        value,
        passes,
    })
}

fn update_issue(
    report: &mut ValidationReport,
    caption: &str,
    rule: FieldRule,
    row: usize,
    failed_before: bool,
    value: &str,
    passes: bool,
) {
    let key = importmap_model::caption_key(caption);
    let position = report
        .issues
        .iter()
        .position(|i| importmap_model::caption_key(&i.caption) == key);

    match (failed_before, passes, position) {
        (true, true, Some(idx)) => {
            let issue = &mut report.issues[idx];
            issue.count = issue.count.saturating_sub(1);
            issue.samples.retain(|s| s.row != row);
            if issue.count == 0 {
                report.issues.remove(idx);
            }
        }
        (true, false, Some(idx)) => {
            if let Some(sample) = report.issues[idx].samples.iter_mut().find(|s| s.row == row) {
                sample.value = value.to_string();
            }
        }
        (false, false, Some(idx)) => {
            let issue = &mut report.issues[idx];
            issue.count += 1;
            insert_sample(issue, row, value);
        }
        (false, false, None) => {
            let mut issue = ValidationIssue::new(caption, rule.description(caption));
            issue.record(row, value);
            report.issues.push(issue);
        }
        _ => {}
    }
}

/// Insert in row order while there is room.
fn insert_sample(issue: &mut ValidationIssue, row: usize, value: &str) {
    if issue.samples.len() >= importmap_model::MAX_ISSUE_SAMPLES {
        return;
    }
    let at = issue.samples.partition_point(|s| s.row < row);
    issue.samples.insert(
        at,
        IssueSample {
            row,
            value: value.to_string(),
        },
    );
}
