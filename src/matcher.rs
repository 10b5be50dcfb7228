//! Column matching: proposes a raw label for each logical column using a
//! layered strategy (exact, synonym dictionary, fuzzy similarity).
//!
//! Matching is pure and deterministic: same logical column, same label set,
//! same dictionary, same answer. The similarity algorithm sits behind the
//! [`Similarity`] trait so it can be swapped without touching the tiered
//! control flow; the default is the diff ratio from the `similar` crate.

use similar::TextDiff;

use crate::registry::{self, Mode};

/// Minimum similarity score (0..=1) for a fuzzy suggestion. Below this, no
/// guess is offered at all.
pub const FUZZY_ACCEPT_THRESHOLD: f64 = 0.70;

pub trait Similarity {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Character-level diff ratio, 0.0 (disjoint) to 1.0 (identical).
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffRatio;

impl Similarity for DiffRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        TextDiff::from_chars(a, b).ratio() as f64
    }
}

/// Which tier produced a suggestion. Carried alongside proposals so callers
/// can show users how confident to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Exact,
    Synonym,
    Fuzzy,
}

impl MatchTier {
    pub fn label(self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::Synonym => "synonym",
            MatchTier::Fuzzy => "fuzzy",
        }
    }
}

/// Proposes a raw label for `logical`, or `None` when nothing clears the
/// bar. `labels` must already be normalized.
pub fn suggest(logical: &str, labels: &[String]) -> Option<String> {
    suggest_with(&DiffRatio, logical, labels).map(|(label, _)| label)
}

/// Tiered resolution, first hit wins:
/// 1. exact: the logical name itself is present among the labels;
/// 2. synonym: first dictionary synonym present, in dictionary order;
/// 3. fuzzy: best-scoring label at or above [`FUZZY_ACCEPT_THRESHOLD`].
pub fn suggest_with<S: Similarity>(
    scorer: &S,
    logical: &str,
    labels: &[String],
) -> Option<(String, MatchTier)> {
    if labels.iter().any(|label| label == logical) {
        return Some((logical.to_string(), MatchTier::Exact));
    }

    if let Some(synonyms) = registry::synonyms_for(logical) {
        for synonym in synonyms {
            if labels.iter().any(|label| label == synonym) {
                return Some(((*synonym).to_string(), MatchTier::Synonym));
            }
        }
    }

    // Scan in sorted order so ties resolve deterministically.
    let mut sorted: Vec<&String> = labels.iter().collect();
    sorted.sort();
    let mut best: Option<(&String, f64)> = None;
    for label in sorted {
        let score = scorer.score(logical, label);
        if best.as_ref().is_none_or(|(_, top)| score > *top) {
            best = Some((label, score));
        }
    }
    match best {
        Some((label, score)) if score >= FUZZY_ACCEPT_THRESHOLD => {
            Some((label.clone(), MatchTier::Fuzzy))
        }
        _ => None,
    }
}

/// One proposal per logical column of the mode, in sorted logical-column
/// order. Unresolvable columns get `None`.
pub fn suggest_all(mode: Mode, labels: &[String]) -> Vec<(String, Option<(String, MatchTier)>)> {
    registry::all_logical_columns(mode)
        .into_iter()
        .map(|logical| {
            let proposal = suggest_with(&DiffRatio, &logical, labels);
            (logical, proposal)
        })
        .collect()
}
