//! Alternate phrasings of the known captions.

use std::collections::BTreeMap;

use crate::score::normalize;

/// Built-in phrasings keyed by caption.
///
/// `Forename(s)` lists `first names` rather than `first name`, and
/// `Email` omits `email address`: a `First Name` or `Email Address` column is a
/// containment match for those captions and must be confirmed by the user.
const BUILTIN: &[(&str, &[&str])] = &[
    (
        "Forename(s)",
        &["forename", "forenames", "first names", "firstname", "given name", "givenname", "given"],
    ),
    (
        "First Name",
        &["first name", "firstname", "forename", "given name", "givenname", "given"],
    ),
    ("Surname", &["surname", "last name", "lastname", "family name", "familyname"]),
    ("Last Name", &["last name", "lastname", "surname", "family name", "familyname"]),
    ("Full Name", &["full name", "fullname", "name", "employee name", "staff name"]),
    ("Email", &["email", "e-mail", "mail"]),
    ("Job Title", &["job title", "title", "position", "job role"]),
    ("Manager Name", &["manager", "line manager", "supervisor"]),
    ("Phone", &["phone", "telephone", "tel", "mobile", "cell"]),
    ("Department", &["department", "dept"]),
    (
        "Org Unit",
        &[
            "org unit",
            "organisation unit",
            "organization unit",
            "business unit",
            "division",
            "org",
            "organization",
            "organisation",
        ],
    ),
    (
        "Start Date",
        &["start date", "hire date", "commencement date", "joining date", "date started"],
    ),
    (
        "Employee ID",
        &[
            "employee id",
            "emp id",
            "employee number",
            "staff id",
            "worker id",
            "personnel number",
            "payroll number",
            "employee code",
            "emp no",
            "employee_no",
            "employeeid",
        ],
    ),
    ("Reference", &["reference", "ref", "external id", "external reference"]),
    ("Username", &["username", "user name", "login", "login name"]),
    ("Role", &["role", "user role", "permission role"]),
    ("Status", &["status", "state", "active", "enabled", "inactive"]),
    ("Location", &["location", "site", "office"]),
];

/// Maps each caption to the phrasings a column header might use for it.
///
/// Keys and phrasings are stored normalized, so lookups ignore case,
/// punctuation and parenthesised qualifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynonymDictionary {
    entries: BTreeMap<String, Vec<String>>,
}

impl SynonymDictionary {
    /// An empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in phrasings for the known captions.
    #[must_use]
    pub fn builtin() -> Self {
        let mut dictionary = Self::new();
        for (caption, phrasings) in BUILTIN {
            dictionary.extend(caption, phrasings.iter().copied());
        }
        dictionary
    }

    /// Add phrasings for a caption, keeping existing ones.
    ///
    /// Phrasings that normalize to nothing or repeat an existing entry are
    /// ignored.
    pub fn extend<'a>(&mut self, caption: &str, phrasings: impl IntoIterator<Item = &'a str>) {
        let key = normalize(caption);
        if key.is_empty() {
            return;
        }
        let entry = self.entries.entry(key).or_default();
        for phrasing in phrasings {
            let normalized = normalize(phrasing);
            if !normalized.is_empty() && !entry.contains(&normalized) {
                entry.push(normalized);
            }
        }
    }

    /// Normalized phrasings for a caption, empty when the caption is unknown.
    #[must_use]
    pub fn phrasings(&self, caption: &str) -> &[String] {
        self.entries
            .get(&normalize(caption))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// True when the caption has any phrasings.
    #[must_use]
    pub fn contains(&self, caption: &str) -> bool {
        !self.phrasings(caption).is_empty()
    }

    /// True when the normalized column name equals one of the caption's
    /// phrasings.
    #[must_use]
    pub fn is_exact_phrasing(&self, column: &str, caption: &str) -> bool {
        let column = normalize(column);
        !column.is_empty() && self.phrasings(caption).contains(&column)
    }

    /// Number of captions with phrasings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no caption has phrasings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
