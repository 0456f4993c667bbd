//! File format options chosen by the user.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field separator of the import file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    /// Separator character.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Self::Comma => ',',
            Self::Tab => '\t',
        }
    }

    /// Separator byte, for the `csv` writer.
    #[must_use]
    pub const fn as_byte(&self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
        }
    }

    /// Parse the selector names `comma` and `tab`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "comma" | "," => Some(Self::Comma),
            "tab" | "\\t" => Some(Self::Tab),
            _ => None,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comma => f.write_str("comma"),
            Self::Tab => f.write_str("tab"),
        }
    }
}

/// Expected layout of `Start Date` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    #[serde(rename = "DD/MM/YYYY")]
    DayMonthYear,
    #[serde(rename = "MM/DD/YYYY")]
    MonthDayYear,
    #[serde(rename = "YYYY-MM-DD")]
    YearMonthDay,
}

impl DateFormat {
    /// Display label, identical to the serialized form.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DayMonthYear => "DD/MM/YYYY",
            Self::MonthDayYear => "MM/DD/YYYY",
            Self::YearMonthDay => "YYYY-MM-DD",
        }
    }

    /// Parse a label such as `YYYY-MM-DD` (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "DD/MM/YYYY" => Some(Self::DayMonthYear),
            "MM/DD/YYYY" => Some(Self::MonthDayYear),
            "YYYY-MM-DD" => Some(Self::YearMonthDay),
            _ => None,
        }
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Options describing how to read one import file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub delimiter: Delimiter,
    /// First non-blank row holds column names.
    pub has_header: bool,
    pub date_format: DateFormat,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            has_header: true,
            date_format: DateFormat::DayMonthYear,
        }
    }
}
