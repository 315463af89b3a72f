//! Mapping authoring assistance.
//!
//! Ranks a source file's headers against a record type's declared fields and
//! proposes one-to-one bindings, greedily assigning the highest-scoring pairs
//! first. The output is a starting point for a human author, not a finished
//! mapping configuration.

use std::collections::BTreeSet;

use gridport_model::RecordType;

use crate::fuzzy::{FuzzyMatchResult, fuzzy_match};

/// A proposed header-to-field binding.
#[derive(Debug, Clone)]
pub struct FieldSuggestion {
    pub header: String,
    pub property_name: String,
    pub result: FuzzyMatchResult,
}

/// Suggest one-to-one bindings from `headers` to `field_names`.
///
/// Pairs scoring below `min_score` are never proposed. Each header and each
/// field is assigned at most once, highest score first.
pub fn suggest_fields(
    headers: &[String],
    field_names: &[&str],
    min_score: f64,
) -> Vec<FieldSuggestion> {
    let mut candidates: Vec<FieldSuggestion> = Vec::new();
    for header in headers {
        if header.trim().is_empty() {
            continue;
        }
        for field in field_names {
            let result = fuzzy_match(header, field, false);
            if result.score >= min_score {
                candidates.push(FieldSuggestion {
                    header: header.clone(),
                    property_name: (*field).to_string(),
                    result,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.result
            .score
            .partial_cmp(&a.result.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.property_name.cmp(&b.property_name))
    });

    let mut used_headers: BTreeSet<String> = BTreeSet::new();
    let mut used_fields: BTreeSet<String> = BTreeSet::new();
    let mut suggestions = Vec::new();
    for candidate in candidates {
        if used_headers.contains(&candidate.header)
            || used_fields.contains(&candidate.property_name)
        {
            continue;
        }
        used_headers.insert(candidate.header.clone());
        used_fields.insert(candidate.property_name.clone());
        suggestions.push(candidate);
    }
    suggestions
}

/// [`suggest_fields`] against a record type's declared dispatch table.
pub fn suggest_for_type<R: RecordType>(headers: &[String], min_score: f64) -> Vec<FieldSuggestion> {
    let field_names: Vec<&str> = R::field_specs().iter().map(|spec| spec.name).collect();
    suggest_fields(headers, &field_names, min_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridport_model::Breaker;

    #[test]
    fn suggests_one_to_one_assignments() {
        let headers = vec![
            "Device ID".to_string(),
            "Scenario".to_string(),
            "Frame Amps".to_string(),
        ];
        let suggestions = suggest_fields(&headers, &["Id", "Scenario", "FrameAmps"], 0.5);

        let assigned: BTreeSet<&str> = suggestions
            .iter()
            .map(|s| s.property_name.as_str())
            .collect();
        assert!(assigned.contains("Scenario"));
        assert!(assigned.contains("FrameAmps"));
        // No field is proposed twice.
        assert_eq!(assigned.len(), suggestions.len());
    }

    #[test]
    fn low_scoring_pairs_are_dropped() {
        let headers = vec!["Completely Unrelated".to_string()];
        let suggestions = suggest_fields(&headers, &["Id"], 0.8);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn type_suggestions_cover_nested_groups() {
        let headers = vec!["Trip Pickup Amps".to_string()];
        let suggestions = suggest_for_type::<Breaker>(&headers, 0.6);
        assert!(
            suggestions
                .iter()
                .any(|s| s.property_name == "Trip.PickupAmps"),
            "expected the nested trip field to be suggested"
        );
    }
}
