//! Column-to-caption scoring.
//!
//! The base score is the strongest name similarity found (exact name, name
//! containment, synonym match or token overlap). Additive adjustments for
//! identifier-like names, department/organisation names and the inferred
//! column type are applied on top, and the sum is clamped to `[0, 1]`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use importmap_model::{ColumnType, ImportColumn};
use regex::Regex;

use crate::synonyms::SynonymDictionary;

const EXACT_MATCH: f32 = 1.0;
const CONTAINMENT_MATCH: f32 = 0.9;
const SYNONYM_EXACT_MATCH: f32 = 0.98;
const SYNONYM_CONTAINMENT_MATCH: f32 = 0.92;
/// Weight applied to the token Jaccard index.
const TOKEN_OVERLAP_WEIGHT: f32 = 0.6;

static PARENTHESISED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("Invalid parenthesised regex"));
static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid non-alphanumeric regex"));
static IDENTIFIER_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(?:id|code|number|no)(?:$|\s)").expect("Invalid identifier regex")
});
static DEPARTMENT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdept\b|department").expect("Invalid department regex"));
static ORG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\borg|organi[sz]ation|business unit|division").expect("Invalid org regex")
});

static BUILTIN_SCORER: LazyLock<Scorer> = LazyLock::new(Scorer::default);

/// Normalize a caption or column name for comparison.
///
/// Lowercases, drops parenthesised groups, turns every run of
/// non-alphanumerics into one space and trims.
pub fn normalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let without_groups = PARENTHESISED.replace_all(&lower, " ");
    let spaced = NON_ALPHANUMERIC.replace_all(&without_groups, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Score a column against a caption with the built-in synonyms.
pub fn score(column: &ImportColumn, caption: &str) -> f32 {
    BUILTIN_SCORER.score(column, caption)
}

/// Score for a single column-caption pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionScore {
    /// Final confidence in `[0, 1]`.
    pub score: f32,
    /// Breakdown of score components for explainability.
    pub explanation: Vec<ScoreComponent>,
}

impl CaptionScore {
    /// Human-readable explanation of the score.
    pub fn explain(&self) -> String {
        if self.explanation.is_empty() {
            return "No similarity".to_string();
        }
        self.explanation
            .iter()
            .map(|c| format!("{}: {:+.0}%", c.name, c.value * 100.0))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A component contributing to the final score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreComponent {
    /// Component name (e.g., "Synonym match").
    pub name: &'static str,
    /// Component value (negative for penalties).
    pub value: f32,
    /// Human-readable description.
    pub description: String,
}

impl ScoreComponent {
    fn new(name: &'static str, value: f32, description: String) -> Self {
        Self {
            name,
            value,
            description,
        }
    }
}

/// Scores columns against captions using a synonym dictionary.
#[derive(Debug, Clone)]
pub struct Scorer {
    synonyms: SynonymDictionary,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(SynonymDictionary::builtin())
    }
}

impl Scorer {
    /// Create a scorer over the given dictionary.
    pub fn new(synonyms: SynonymDictionary) -> Self {
        Self { synonyms }
    }

    /// The dictionary in use.
    pub fn synonyms(&self) -> &SynonymDictionary {
        &self.synonyms
    }

    /// Score in `[0, 1]`. Pure and deterministic.
    pub fn score(&self, column: &ImportColumn, caption: &str) -> f32 {
        self.score_explained(column, caption).score
    }

    /// True when the column name equals the caption or one of its phrasings
    /// after normalization.
    pub fn is_exact_match(&self, column: &str, caption: &str) -> bool {
        let normalized_column = normalize(column);
        let normalized_caption = normalize(caption);
        if normalized_column.is_empty() || normalized_caption.is_empty() {
            return false;
        }
        normalized_column == normalized_caption || self.synonyms.is_exact_phrasing(column, caption)
    }

    /// Score with a breakdown of what contributed to it.
    pub fn score_explained(&self, column: &ImportColumn, caption: &str) -> CaptionScore {
        let col = normalize(&column.name);
        let cap = normalize(caption);

        let mut explanation = Vec::new();
        let base = self.best_similarity(&col, &cap);
        let mut score = base.as_ref().map_or(0.0, |c| c.value);
        explanation.extend(base);

        for adjustment in adjustments(&col, &cap, column.column_type) {
            score += adjustment.value;
            explanation.push(adjustment);
        }

        CaptionScore {
            score: score.clamp(0.0, 1.0),
            explanation,
        }
    }

    /// Strongest name similarity; the first component wins ties.
    fn best_similarity(&self, col: &str, cap: &str) -> Option<ScoreComponent> {
        let mut best: Option<ScoreComponent> = None;
        let mut offer = |component: ScoreComponent| {
            if best.as_ref().is_none_or(|b| component.value > b.value) {
                best = Some(component);
            }
        };

        if !col.is_empty() && !cap.is_empty() {
            if col == cap {
                offer(ScoreComponent::new(
                    "Exact name",
                    EXACT_MATCH,
                    format!("'{col}' equals the caption"),
                ));
            }
            if contains_either(col, cap) {
                offer(ScoreComponent::new(
                    "Name containment",
                    CONTAINMENT_MATCH,
                    format!("'{col}' and '{cap}' overlap"),
                ));
            }
        }

        let own = [cap.to_string()];
        let phrasings = match self.synonyms.phrasings(cap) {
            [] => &own[..],
            known => known,
        };
        for phrasing in phrasings {
            if col.is_empty() || phrasing.is_empty() {
                continue;
            }
            if col == phrasing {
                offer(ScoreComponent::new(
                    "Synonym match",
                    SYNONYM_EXACT_MATCH,
                    format!("'{col}' is a phrasing of '{cap}'"),
                ));
            } else if contains_either(col, phrasing) {
                offer(ScoreComponent::new(
                    "Synonym containment",
                    SYNONYM_CONTAINMENT_MATCH,
                    format!("'{col}' overlaps phrasing '{phrasing}'"),
                ));
            }
        }

        let overlap = TOKEN_OVERLAP_WEIGHT * jaccard(col, cap);
        if overlap > 0.0 {
            offer(ScoreComponent::new(
                "Token overlap",
                overlap,
                format!("shared words between '{col}' and '{cap}'"),
            ));
        }

        best
    }
}

fn contains_either(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

fn jaccard(a: &str, b: &str) -> f32 {
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    shared as f32 / union as f32
}

/// Additive adjustments keyed on the normalized column name and type.
fn adjustments(col: &str, cap: &str, column_type: ColumnType) -> Vec<ScoreComponent> {
    let mut out = Vec::new();
    let mut adjust = |applies: bool, target: &str, name: &'static str, value: f32, why: &str| {
        if applies && cap == target {
            out.push(ScoreComponent::new(name, value, why.to_string()));
        }
    };

    let identifier = IDENTIFIER_NAME.is_match(col);
    adjust(identifier, "employee id", "Identifier name", 0.25, "column name looks like an identifier");
    adjust(identifier, "reference", "Identifier name", 0.15, "column name looks like an identifier");

    let department = DEPARTMENT_NAME.is_match(col);
    adjust(department, "department", "Department name", 0.25, "column names a department");
    adjust(department, "org unit", "Department name", -0.05, "department rather than org unit");

    let org = ORG_NAME.is_match(col);
    adjust(org, "org unit", "Organisation name", 0.2, "column names an organisational unit");

    let email = column_type == ColumnType::Email;
    adjust(email, "email", "Column type", 0.3, "values contain '@'");
    adjust(email, "username", "Column type", 0.1, "values contain '@'");

    let date = column_type == ColumnType::Date;
    adjust(date, "start date", "Column type", 0.3, "values look like dates");

    let number = column_type == ColumnType::Number;
    adjust(number, "employee id", "Column type", 0.15, "values are numeric");
    adjust(number, "reference", "Column type", 0.1, "values are numeric");

    out
}
