//! Fuzzy string matching between source headers and target field names.
//!
//! Pure scoring functions used while authoring a mapping configuration,
//! never during import execution. The ladder of rules is ordered from exact
//! to heuristic; the first rule that applies wins. Heuristic scores blend
//! Levenshtein normalized similarity (edit distance) with Jaro-Winkler
//! (prefix weighted), leaning on the prefix algorithm for short strings
//! where abbreviations and units dominate.

use std::cmp::Ordering;

use rapidfuzz::distance::{jaro_winkler, levenshtein};
use serde::{Deserialize, Serialize};

/// Score awarded for case-insensitive equality.
const SCORE_CASE_INSENSITIVE: f64 = 0.98;
/// Score awarded for separator-stripped equality (`LV Breakers` vs `LVBreakers`).
const SCORE_NORMALIZED: f64 = 0.96;
/// Below this length the prefix-weighted algorithm gets the larger weight.
const SHORT_STRING_LEN: usize = 4;
/// Raw-score gap under which the blend is reported as Hybrid.
const HYBRID_GAP: f64 = 0.05;

/// Which rule produced a match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchReason {
    Exact,
    CaseInsensitive,
    Normalized,
    Hybrid,
    EditDistance,
    PrefixWeighted,
    NoMatch,
}

impl MatchReason {
    /// Short human-readable tag for reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::CaseInsensitive => "case-insensitive",
            Self::Normalized => "normalized",
            Self::Hybrid => "hybrid",
            Self::EditDistance => "edit-distance",
            Self::PrefixWeighted => "prefix-weighted",
            Self::NoMatch => "no match",
        }
    }
}

/// Result of scoring one source string against one target string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyMatchResult {
    pub source: String,
    pub target: String,
    /// Confidence in `[0.0, 1.0]`.
    pub score: f64,
    pub reason: MatchReason,
}

/// Score `source` against `target`.
pub fn fuzzy_match(source: &str, target: &str, case_sensitive: bool) -> FuzzyMatchResult {
    let result = |score: f64, reason: MatchReason| FuzzyMatchResult {
        source: source.to_string(),
        target: target.to_string(),
        score,
        reason,
    };

    if source.trim().is_empty() || target.trim().is_empty() {
        return result(0.0, MatchReason::NoMatch);
    }
    if source == target {
        return result(1.0, MatchReason::Exact);
    }
    if !case_sensitive && source.to_lowercase() == target.to_lowercase() {
        return result(SCORE_CASE_INSENSITIVE, MatchReason::CaseInsensitive);
    }
    if condense(source) == condense(target) {
        return result(SCORE_NORMALIZED, MatchReason::Normalized);
    }

    let (left, right) = if case_sensitive {
        (source.to_string(), target.to_string())
    } else {
        (source.to_lowercase(), target.to_lowercase())
    };
    let edit = levenshtein::normalized_similarity(left.chars(), right.chars());
    let prefix = jaro_winkler::similarity(left.chars(), right.chars());

    let short =
        source.chars().count() <= SHORT_STRING_LEN || target.chars().count() <= SHORT_STRING_LEN;
    let (prefix_weight, edit_weight) = if short { (0.6, 0.4) } else { (0.5, 0.5) };
    let score = prefix * prefix_weight + edit * edit_weight;

    let reason = if (prefix - edit).abs() < HYBRID_GAP {
        MatchReason::Hybrid
    } else if prefix > edit {
        MatchReason::PrefixWeighted
    } else {
        MatchReason::EditDistance
    };
    result(score, reason)
}

/// Score a query against every non-blank candidate and return the best.
///
/// Results below `min_score` are discarded; survivors are sorted by score
/// descending with ties broken by shorter candidate, truncated to
/// `max_results`. An empty query or candidate list yields an empty result,
/// not an error.
pub fn find_best_matches(
    query: &str,
    candidates: &[String],
    max_results: usize,
    min_score: f64,
    case_sensitive: bool,
) -> Vec<FuzzyMatchResult> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let mut results: Vec<FuzzyMatchResult> = candidates
        .iter()
        .filter(|candidate| !candidate.trim().is_empty())
        .map(|candidate| fuzzy_match(query, candidate, case_sensitive))
        .filter(|result| result.score >= min_score)
        .collect();

    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.target.len().cmp(&b.target.len()))
            .then_with(|| a.target.cmp(&b.target))
    });
    results.truncate(max_results);
    results
}

/// Strip spaces, underscores, hyphens, and slashes, then lowercase.
fn condense(text: &str) -> String {
    text.chars()
        .filter(|ch| !matches!(ch, ' ' | '_' | '-' | '/'))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_match_exactly() {
        for text in ["Id", "Base kV", "LV Breakers"] {
            let result = fuzzy_match(text, text, false);
            assert_eq!(result.score, 1.0);
            assert_eq!(result.reason, MatchReason::Exact);
        }
    }

    #[test]
    fn case_insensitive_equality_scores_098() {
        let result = fuzzy_match("Id", "ID", false);
        assert_eq!(result.score, SCORE_CASE_INSENSITIVE);
        assert_eq!(result.reason, MatchReason::CaseInsensitive);
    }

    #[test]
    fn case_sensitive_mode_skips_the_case_rule() {
        let result = fuzzy_match("Id", "ID", true);
        assert_ne!(result.reason, MatchReason::CaseInsensitive);
    }

    #[test]
    fn separator_stripped_equality_scores_096() {
        let result = fuzzy_match("LV Breakers", "LVBreakers", false);
        assert_eq!(result.score, SCORE_NORMALIZED);
        assert_eq!(result.reason, MatchReason::Normalized);

        let result = fuzzy_match("base_kv", "Base kV", false);
        assert_eq!(result.reason, MatchReason::Normalized);
    }

    #[test]
    fn blank_input_never_matches() {
        let result = fuzzy_match("", "anything", false);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.reason, MatchReason::NoMatch);

        let result = fuzzy_match("anything", "   ", false);
        assert_eq!(result.reason, MatchReason::NoMatch);
    }

    #[test]
    fn dissimilar_strings_blend_below_the_ladder() {
        let result = fuzzy_match("Frame Amps", "Conductors", false);
        assert!(result.score < SCORE_NORMALIZED);
        assert!(
            matches!(
                result.reason,
                MatchReason::Hybrid | MatchReason::EditDistance | MatchReason::PrefixWeighted
            ),
            "unexpected reason {:?}",
            result.reason
        );
    }

    #[test]
    fn find_best_matches_honors_limits_and_order() {
        let candidates = vec![
            "Id".to_string(),
            "Identifier".to_string(),
            "Zone".to_string(),
            "Scenario".to_string(),
        ];
        let results = find_best_matches("ID", &candidates, 2, 0.5, false);

        assert!(results.len() <= 2);
        assert!(results.iter().all(|r| r.score >= 0.5));
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(results[0].target, "Id");
    }

    #[test]
    fn ties_prefer_the_shorter_candidate() {
        let candidates = vec!["Base kV LN".to_string(), "Base kV".to_string()];
        let results = find_best_matches("Base kV", &candidates, 10, 0.0, false);
        assert_eq!(results[0].target, "Base kV");
    }

    #[test]
    fn empty_query_or_candidates_yield_empty() {
        assert!(find_best_matches("", &["Id".to_string()], 5, 0.0, false).is_empty());
        assert!(find_best_matches("Id", &[], 5, 0.0, false).is_empty());
    }
}
