//! Matching engine implementation.

use std::collections::BTreeMap;

use importmap_model::{ImportColumn, MatchCandidate, caption_key};

use crate::error::MappingError;
use crate::score::{CaptionScore, Scorer};
use crate::synonyms::SynonymDictionary;

/// Default minimum score for a caption to be suggested at all.
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f32 = 0.72;
/// Default score at or above which a suggestion is applied without review.
pub const DEFAULT_CERTAINTY_THRESHOLD: f32 = 0.97;

/// Whether a candidate may be applied without asking the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Certainty {
    /// Exact name or phrasing match, or very high confidence. Auto-applied
    /// and confirmed.
    Certain,
    /// Shown as a suggestion; the user must confirm it.
    Uncertain,
}

impl Certainty {
    /// Returns a human-readable description of the certainty.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Certain => "auto-applied",
            Self::Uncertain => "needs confirmation",
        }
    }
}

/// Configurable thresholds for suggesting and auto-applying matches.
///
/// - Below `acceptance`: rejected (not suggested)
/// - `acceptance` to `certainty`: [`Certainty::Uncertain`] unless the names
///   match exactly
/// - At or above `certainty`: [`Certainty::Certain`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    /// Minimum score to suggest a column (default: 0.72).
    pub acceptance: f32,
    /// Minimum confidence to auto-apply (default: 0.97).
    pub certainty: f32,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            acceptance: DEFAULT_ACCEPTANCE_THRESHOLD,
            certainty: DEFAULT_CERTAINTY_THRESHOLD,
        }
    }
}

impl MatchThresholds {
    /// Validated thresholds: `0 <= acceptance <= certainty <= 1`.
    pub fn new(acceptance: f32, certainty: f32) -> Result<Self, MappingError> {
        let valid = (0.0..=1.0).contains(&acceptance)
            && (0.0..=1.0).contains(&certainty)
            && acceptance <= certainty;
        if !valid {
            return Err(MappingError::InvalidThresholds {
                acceptance,
                certainty,
            });
        }
        Ok(Self {
            acceptance,
            certainty,
        })
    }
}

/// A candidate together with its classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedCandidate {
    pub candidate: MatchCandidate,
    pub certainty: Certainty,
}

/// Suggestions for one import, split by certainty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionSet {
    /// Applied and confirmed when the set is applied.
    pub certain: Vec<MatchCandidate>,
    /// Offered to the user for confirmation.
    pub uncertain: Vec<MatchCandidate>,
}

impl SuggestionSet {
    /// Total number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.certain.len() + self.uncertain.len()
    }

    /// True when there is nothing to apply.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.certain.is_empty() && self.uncertain.is_empty()
    }

    /// Every candidate, certain ones first.
    pub fn iter(&self) -> impl Iterator<Item = &MatchCandidate> {
        self.certain.iter().chain(self.uncertain.iter())
    }
}

/// Matches import columns to captions.
///
/// Works captions-first: each caption picks its best-scoring column, then
/// captions that picked the same column are resolved by confidence.
#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    scorer: Scorer,
    thresholds: MatchThresholds,
}

impl MatchingEngine {
    /// Create an engine over a synonym dictionary.
    pub fn new(synonyms: SynonymDictionary, thresholds: MatchThresholds) -> Self {
        Self {
            scorer: Scorer::new(synonyms),
            thresholds,
        }
    }

    /// Thresholds in use.
    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    /// The underlying scorer.
    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Score one pair with its explanation.
    pub fn explain(&self, column: &ImportColumn, caption: &str) -> CaptionScore {
        self.scorer.score_explained(column, caption)
    }

    /// At most one candidate per caption and per column.
    ///
    /// For each non-blank caption the best-scoring column is taken (the first
    /// column wins ties) if it reaches the acceptance threshold. Confidence is
    /// rounded to two decimals.
    pub fn compute_suggestions(
        &self,
        columns: &[ImportColumn],
        captions: &[String],
    ) -> Vec<MatchCandidate> {
        if columns.is_empty() || captions.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for caption in captions.iter().filter(|c| !c.trim().is_empty()) {
            let mut best: Option<(&ImportColumn, f32)> = None;
            for column in columns {
                let score = self.scorer.score(column, caption);
                if score > 0.0 && best.is_none_or(|(_, b)| score > b) {
                    best = Some((column, score));
                }
            }

            if let Some((column, score)) = best
                && score >= self.thresholds.acceptance
            {
                tracing::trace!(
                    column = %column.name,
                    caption = %caption,
                    score,
                    "Caption candidate"
                );
                candidates.push(MatchCandidate::new(
                    column.name.clone(),
                    caption.clone(),
                    round_confidence(score),
                ));
            }
        }

        resolve_collisions(candidates)
    }

    /// Certain iff the normalized names are equal, the column equals one of
    /// the caption's phrasings, or the confidence reaches the certainty
    /// threshold.
    pub fn classify(&self, candidate: &MatchCandidate) -> Certainty {
        if self
            .scorer
            .is_exact_match(&candidate.csv_column, &candidate.target_caption)
            || candidate.confidence >= self.thresholds.certainty
        {
            Certainty::Certain
        } else {
            Certainty::Uncertain
        }
    }

    /// Classify every candidate, keeping order.
    pub fn classify_all(&self, candidates: Vec<MatchCandidate>) -> Vec<ClassifiedCandidate> {
        candidates
            .into_iter()
            .map(|candidate| ClassifiedCandidate {
                certainty: self.classify(&candidate),
                candidate,
            })
            .collect()
    }

    /// Split candidates into a [`SuggestionSet`].
    pub fn split(&self, candidates: Vec<MatchCandidate>) -> SuggestionSet {
        let mut set = SuggestionSet::default();
        for classified in self.classify_all(candidates) {
            match classified.certainty {
                Certainty::Certain => set.certain.push(classified.candidate),
                Certainty::Uncertain => set.uncertain.push(classified.candidate),
            }
        }
        set
    }

    /// Compute and classify heuristic suggestions.
    pub fn suggest(&self, columns: &[ImportColumn], captions: &[String]) -> SuggestionSet {
        self.split(self.compute_suggestions(columns, captions))
    }
}

/// Round to two decimals.
fn round_confidence(score: f32) -> f32 {
    (score * 100.0).round() / 100.0
}

/// Keep one candidate per column: the higher confidence wins, the earlier
/// candidate wins ties. Survivors keep their original order.
pub fn resolve_collisions(candidates: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
    keep_best_by(candidates, |c| c.csv_column.clone())
}

/// Merge heuristic and provider candidates.
///
/// Repeated column/caption pairs collapse to the higher confidence, then each
/// caption and each column keeps only its best candidate. Heuristic candidates
/// come first, so they win ties.
pub fn merge_candidates(
    heuristic: Vec<MatchCandidate>,
    provider: Vec<MatchCandidate>,
) -> Vec<MatchCandidate> {
    let combined: Vec<MatchCandidate> = heuristic.into_iter().chain(provider).collect();
    let pairs = keep_best_by(combined, |c| {
        format!("{}::{}", c.csv_column, caption_key(&c.target_caption))
    });
    let per_caption = keep_best_by(pairs, |c| caption_key(&c.target_caption));
    resolve_collisions(per_caption)
}

fn keep_best_by<K: Ord>(
    candidates: Vec<MatchCandidate>,
    key: impl Fn(&MatchCandidate) -> K,
) -> Vec<MatchCandidate> {
    let mut winners: BTreeMap<K, usize> = BTreeMap::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        winners
            .entry(key(candidate))
            .and_modify(|best| {
                if candidate.confidence > candidates[*best].confidence {
                    *best = idx;
                }
            })
            .or_insert(idx);
    }

    let mut keep = vec![false; candidates.len()];
    for idx in winners.into_values() {
        keep[idx] = true;
    }
    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(candidate, kept)| kept.then_some(candidate))
        .collect()
}
