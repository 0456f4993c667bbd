//! Validation issue types.

use serde::{Deserialize, Serialize};

/// Maximum number of offending rows kept per issue.
pub const MAX_ISSUE_SAMPLES: usize = 5;

/// One offending cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSample {
    /// 1-based row number as the user sees it in the file.
    pub row: usize,
    /// The offending value (trimmed).
    pub value: String,
}

/// Values of one mapped caption that failed its format check.
///
/// Informational only; never blocks export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Caption whose mapped column was checked.
    pub caption: String,
    /// Human-readable rule, e.g. `Expected date format DD/MM/YYYY`.
    pub rule: String,
    /// Number of non-empty values that failed.
    pub count: usize,
    /// Up to [`MAX_ISSUE_SAMPLES`] offending cells, in row order.
    pub samples: Vec<IssueSample>,
}

impl ValidationIssue {
    /// Create an issue with no failures recorded yet.
    #[must_use]
    pub fn new(caption: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            rule: rule.into(),
            count: 0,
            samples: Vec::new(),
        }
    }

    /// Count a failing value, keeping it as a sample while there is room.
    pub fn record(&mut self, row: usize, value: &str) {
        self.count += 1;
        if self.samples.len() < MAX_ISSUE_SAMPLES {
            self.samples.push(IssueSample {
                row,
                value: value.to_string(),
            });
        }
    }

    /// Row numbers of the kept samples.
    #[must_use]
    pub fn sample_rows(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.row).collect()
    }

    /// Format message with issue-specific data.
    #[must_use]
    pub fn message(&self) -> String {
        let rows = self
            .samples
            .iter()
            .map(|s| format!("row {} \"{}\"", s.row, s.value))
            .collect::<Vec<_>>()
            .join(", ");
        let plural = if self.count == 1 { "" } else { "s" };
        if rows.is_empty() {
            format!("{}: {} ({} row{plural})", self.caption, self.rule, self.count)
        } else {
            format!(
                "{}: {} ({} row{plural}, e.g. {rows})",
                self.caption, self.rule, self.count
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_caps_samples() {
        let mut issue = ValidationIssue::new("Phone", "Invalid phone");
        for row in 1..=8 {
            issue.record(row, "x");
        }
        assert_eq!(issue.count, 8);
        assert_eq!(issue.sample_rows(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn message_lists_samples() {
        let mut issue = ValidationIssue::new("Email", "Invalid email");
        issue.record(3, "not-an-email");
        assert_eq!(
            issue.message(),
            "Email: Invalid email (1 row, e.g. row 3 \"not-an-email\")"
        );
    }
}
