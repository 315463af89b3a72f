//! Fuzzy matching engine for mapping configuration authoring.
//!
//! Scores similarity between source column headers and target record fields,
//! and proposes bindings. Used out-of-band by authoring tools; import
//! execution never consults this crate.

pub mod fuzzy;
pub mod suggest;

pub use fuzzy::{FuzzyMatchResult, MatchReason, find_best_matches, fuzzy_match};
pub use suggest::{FieldSuggestion, suggest_fields, suggest_for_type};
