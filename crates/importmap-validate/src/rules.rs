//! Per-caption value checks.

use std::sync::LazyLock;

use importmap_model::{DateFormat, caption_key};
use regex::Regex;

/// Loose `local@domain` shape; a dotted domain is not required.
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("Invalid email regex"));

static EMPLOYEE_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z][0-9A-Za-z\-_.]*$").expect("Invalid employee id regex")
});

static SLASH_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").expect("Invalid slash date regex"));

static ISO_DATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("Invalid ISO date regex"));

/// Minimum digits in a phone number.
const PHONE_MIN_DIGITS: usize = 7;

/// Check applied to every non-empty value of a mapped caption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Email,
    Phone,
    EmployeeId,
    /// Value must not be blank.
    Required,
    Date(DateFormat),
}

impl FieldRule {
    /// Rule for a caption, `None` for captions without a check.
    pub fn for_caption(caption: &str, date_format: DateFormat) -> Option<Self> {
        match caption_key(caption).as_str() {
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "employee id" => Some(Self::EmployeeId),
            "reference" | "username" => Some(Self::Required),
            "start date" => Some(Self::Date(date_format)),
            _ => None,
        }
    }

    /// Rule text shown in reports.
    pub fn description(&self, caption: &str) -> String {
        match self {
            Self::Date(format) => format!("Expected date format {format}"),
            _ => format!("Invalid {}", caption.trim().to_lowercase()),
        }
    }

    /// True when the trimmed value passes.
    pub fn check(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Self::Email => EMAIL_REGEX.is_match(value),
            Self::Phone => value.chars().filter(char::is_ascii_digit).count() >= PHONE_MIN_DIGITS,
            Self::EmployeeId => EMPLOYEE_ID_REGEX.is_match(value),
            Self::Required => !value.is_empty(),
            Self::Date(DateFormat::DayMonthYear | DateFormat::MonthDayYear) => {
                SLASH_DATE_REGEX.is_match(value)
            }
            Self::Date(DateFormat::YearMonthDay) => ISO_DATE_REGEX.is_match(value),
        }
    }

    /// Empty values are always accepted.
    pub fn accepts(&self, value: &str) -> bool {
        value.trim().is_empty() || self.check(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_lookup_ignores_case() {
        let format = DateFormat::default();
        assert_eq!(FieldRule::for_caption(" EMAIL", format), Some(FieldRule::Email));
        assert_eq!(
            FieldRule::for_caption("Start Date", DateFormat::YearMonthDay),
            Some(FieldRule::Date(DateFormat::YearMonthDay))
        );
        assert_eq!(FieldRule::for_caption("Job Title", format), None);
    }

    #[test]
    fn test_email_shape_is_loose() {
        assert!(FieldRule::Email.check("abc@x"));
        assert!(FieldRule::Email.check(" ann@example.com "));
        assert!(!FieldRule::Email.check("not-an-email"));
        assert!(!FieldRule::Email.check("a b@x"));
        assert!(!FieldRule::Email.check("a@b@c"));
    }

    #[test]
    fn test_phone_counts_digits() {
        assert!(FieldRule::Phone.check("+44 (0) 1234"));
        assert!(!FieldRule::Phone.check("123-456"));
    }

    #[test]
    fn test_employee_id() {
        assert!(FieldRule::EmployeeId.check("E-100.2_b"));
        assert!(!FieldRule::EmployeeId.check("-100"));
        assert!(!FieldRule::EmployeeId.check("E 100"));
    }

    #[test]
    fn test_dates_follow_format() {
        let dmy = FieldRule::Date(DateFormat::DayMonthYear);
        assert!(dmy.check("01/02/2024"));
        assert!(!dmy.check("1/2/2024"));
        assert!(!dmy.check("2024-02-01"));
        assert_eq!(dmy.description("Start Date"), "Expected date format DD/MM/YYYY");

        let iso = FieldRule::Date(DateFormat::YearMonthDay);
        assert!(iso.check("2024-02-01"));
        assert!(!iso.check("01/02/2024"));
    }

    #[test]
    fn test_empty_values_always_pass() {
        assert!(FieldRule::Required.accepts("  "));
        assert!(FieldRule::Email.accepts(""));
        assert!(!FieldRule::Required.check(" "));
        assert_eq!(FieldRule::Required.description("Reference"), "Invalid reference");
    }
}
