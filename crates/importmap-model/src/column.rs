//! Inferred import columns.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse value type inferred from a column's sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every non-empty value parses as a number.
    Number,
    /// At least one value contains `@`.
    Email,
    /// At least one value looks like `d/m/yyyy`.
    Date,
    /// Anything else, including columns with no values at all.
    #[default]
    Text,
}

impl ColumnType {
    /// Lowercase label used in logs and terminal output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Email => "email",
            Self::Date => "date",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of the imported file.
///
/// Built once per parse by the inferencer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportColumn {
    /// Header text, or a synthesized `Column N` name.
    pub name: String,
    /// Stable 0-based position in the source rows.
    pub index: usize,
    /// First three non-empty data values.
    pub sample: Vec<String>,
    /// Inferred value type.
    pub column_type: ColumnType,
}

impl ImportColumn {
    /// Name used when the header cell is missing or there is no header row.
    #[must_use]
    pub fn synthesized_name(index: usize) -> String {
        format!("Column {}", index + 1)
    }

    /// The first sampled value, if the column has any data.
    #[must_use]
    pub fn first_sample(&self) -> Option<&str> {
        self.sample.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesized_names_are_one_based() {
        assert_eq!(ImportColumn::synthesized_name(0), "Column 1");
        assert_eq!(ImportColumn::synthesized_name(9), "Column 10");
    }

    #[test]
    fn column_type_serializes_lowercase() {
        let json = serde_json::to_string(&ColumnType::Email).unwrap();
        assert_eq!(json, "\"email\"");
        assert_eq!(ColumnType::Date.to_string(), "date");
    }
}
