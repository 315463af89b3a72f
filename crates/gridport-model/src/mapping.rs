//! Mapping configuration: declarative column-to-field bindings.
//!
//! A mapping configuration is a hand-authored JSON document that binds source
//! column headers to record-type fields. It goes through a fixed lifecycle:
//! [`MappingConfiguration::load`], [`MappingConfiguration::normalize`],
//! [`MappingConfiguration::validate`], and finally
//! [`MappingConfiguration::to_immutable`], which produces the only form that
//! is safe to share across concurrent import calls.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, Result};

/// How serious a missing mapped column is for the entry that declares it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Severity {
    Info,
    #[default]
    Warning,
    Error,
}

/// One column-to-field binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MappingEntry {
    /// Target record type name. Dot-qualified for nested groups
    /// (e.g. `Breaker.Trip`).
    pub target_type: String,
    /// Target field name within the record type (or nested group).
    pub property_name: String,
    /// Expected source column header, compared trimmed and case-insensitively.
    pub column_header: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub severity: Severity,
    /// Fallback assigned when the column is absent and severity is not Error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Alternate header spellings. Declared and round-tripped, not yet
    /// consulted during header matching.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

impl MappingEntry {
    /// Duplicate identity: case-insensitive `(target type, property name)`.
    pub fn identity(&self) -> (String, String) {
        (
            self.target_type.to_lowercase(),
            self.property_name.to_lowercase(),
        )
    }

    /// The top-level record type name (the part before any nested-group dot).
    pub fn top_level_type(&self) -> &str {
        self.target_type.split('.').next().unwrap_or("")
    }

    /// True when the entry targets a nested group (`Parent.Child`).
    pub fn is_nested_group(&self) -> bool {
        self.target_type.contains('.')
    }

    fn has_blank_key_field(&self) -> bool {
        self.target_type.trim().is_empty()
            || self.property_name.trim().is_empty()
            || self.column_header.trim().is_empty()
    }
}

/// Outcome of validating a mapping configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A mutable, authoring-time mapping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MappingConfiguration {
    /// Compatibility tag of the software the mapping was authored against.
    pub software_version: String,
    /// Free-form version of the configuration itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_version: Option<String>,
    #[serde(default)]
    pub import_map: Vec<MappingEntry>,
}

impl MappingConfiguration {
    /// Deserialize a configuration from a JSON file.
    ///
    /// Every field name in the document must start with an uppercase letter
    /// and contain only letters and digits; names starting with `$` (schema
    /// directives) are exempt. The configuration is hand-authored, and silent
    /// case-insensitive acceptance previously produced entries with empty
    /// target fields, so the check is strict and fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&contents).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        check_field_names(&value)?;
        serde_json::from_value(value).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ModelError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Trim the key fields of every entry in place.
    pub fn normalize(&mut self) {
        for entry in &mut self.import_map {
            entry.target_type = entry.target_type.trim().to_string();
            entry.property_name = entry.property_name.trim().to_string();
            entry.column_header = entry.column_header.trim().to_string();
        }
    }

    /// Validate the configuration.
    ///
    /// Duplicate `(TargetType, PropertyName)` groups yield one warning each;
    /// blank key fields yield one error per entry; a `Required` entry inside
    /// a duplicate group yields one error, because a required field must be
    /// unambiguous.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        let mut groups: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
        for (index, entry) in self.import_map.iter().enumerate() {
            groups.entry(entry.identity()).or_default().push(index);
        }

        for indices in groups.values() {
            if indices.len() > 1 {
                let first = &self.import_map[indices[0]];
                result.warnings.push(format!(
                    "duplicate mapping for {}.{}: {} entries declared, first occurrence used",
                    first.target_type,
                    first.property_name,
                    indices.len()
                ));
                for &index in indices {
                    let entry = &self.import_map[index];
                    if entry.required {
                        result.errors.push(format!(
                            "required mapping for {}.{} is duplicated and therefore ambiguous",
                            entry.target_type, entry.property_name
                        ));
                    }
                }
            }
        }

        for (index, entry) in self.import_map.iter().enumerate() {
            if entry.has_blank_key_field() {
                result.errors.push(format!(
                    "entry {index} has a blank TargetType, PropertyName, or ColumnHeader"
                ));
            }
        }

        result
    }

    /// Produce a read-only, deep-cloned snapshot.
    ///
    /// Fails with [`ModelError::Validation`] when `validate` reports errors;
    /// a configuration that does not validate cleanly must never drive an
    /// import.
    pub fn to_immutable(&self) -> Result<ImmutableMappingConfiguration> {
        let report = self.validate();
        if report.has_errors() {
            return Err(ModelError::Validation {
                errors: report.errors,
            });
        }
        Ok(ImmutableMappingConfiguration {
            software_version: self.software_version.clone(),
            map_version: self.map_version.clone(),
            entries: self.import_map.clone(),
        })
    }
}

/// A validated, read-only snapshot of a mapping configuration.
///
/// Exposes no mutators and owns deep clones of every entry, so it is safe to
/// share (e.g. behind an `Arc`) across parallel import calls.
#[derive(Debug, Clone)]
pub struct ImmutableMappingConfiguration {
    software_version: String,
    map_version: Option<String>,
    entries: Vec<MappingEntry>,
}

impl ImmutableMappingConfiguration {
    pub fn software_version(&self) -> &str {
        &self.software_version
    }

    pub fn map_version(&self) -> Option<&str> {
        self.map_version.as_deref()
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Distinct top-level record type names, as declared. Dot-qualified
    /// nested groups do not contribute their own type name.
    pub fn top_level_types(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        let mut names = Vec::new();
        for entry in &self.entries {
            if entry.is_nested_group() {
                continue;
            }
            if seen.insert(entry.target_type.to_lowercase()) {
                names.push(entry.target_type.as_str());
            }
        }
        names
    }

    /// Distinct declared column headers for an exact top-level type,
    /// lowercased for case-insensitive comparison. Nested-group entries are
    /// excluded: they populate records but do not vote in signature scoring.
    pub fn declared_headers_for(&self, target_type: &str) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|entry| {
                !entry.is_nested_group() && entry.target_type.eq_ignore_ascii_case(target_type)
            })
            .map(|entry| entry.column_header.to_lowercase())
            .collect()
    }

    /// Every declared column header across all entries, lowercased.
    pub fn all_declared_headers(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .map(|entry| entry.column_header.to_lowercase())
            .collect()
    }

    /// Entries belonging to a top-level type, including its nested groups.
    pub fn entries_for(&self, top_level: &str) -> Vec<&MappingEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.top_level_type().eq_ignore_ascii_case(top_level))
            .collect()
    }

    /// The declared column header of a type's identifier property, if mapped.
    pub fn identifier_header_for(&self, top_level: &str, identifier_property: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| {
                !entry.is_nested_group()
                    && entry.target_type.eq_ignore_ascii_case(top_level)
                    && entry.property_name.eq_ignore_ascii_case(identifier_property)
            })
            .map(|entry| entry.column_header.as_str())
    }
}

/// Recursively enforce the strict field-name rule over a JSON document.
fn check_field_names(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                if !is_valid_field_name(key) {
                    return Err(ModelError::FieldName { name: key.clone() });
                }
                check_field_names(nested)?;
            }
        }
        Value::Array(items) => {
            for item in items {
                check_field_names(item)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn is_valid_field_name(name: &str) -> bool {
    // Schema-directive convention: keys starting with `$` are not ours.
    if name.starts_with('$') {
        return true;
    }
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_uppercase() && chars.all(|ch| ch.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(target_type: &str, property: &str, header: &str) -> MappingEntry {
        MappingEntry {
            target_type: target_type.to_string(),
            property_name: property.to_string(),
            column_header: header.to_string(),
            required: false,
            severity: Severity::Warning,
            default_value: None,
            aliases: Vec::new(),
        }
    }

    fn config(entries: Vec<MappingEntry>) -> MappingConfiguration {
        MappingConfiguration {
            software_version: "24.1".to_string(),
            map_version: None,
            import_map: entries,
        }
    }

    #[test]
    fn normalize_trims_key_fields() {
        let mut cfg = config(vec![entry(" Bus ", " Id ", " Bus ID ")]);
        cfg.normalize();
        let e = &cfg.import_map[0];
        assert_eq!(e.target_type, "Bus");
        assert_eq!(e.property_name, "Id");
        assert_eq!(e.column_header, "Bus ID");
    }

    #[test]
    fn duplicate_mapping_warns_and_required_duplicate_errors() {
        let mut required = entry("Bus", "Id", "Bus ID");
        required.required = true;
        required.severity = Severity::Error;
        let cfg = config(vec![required, entry("bus", "id", "Bus Name")]);

        let report = cfg.validate();
        assert_eq!(report.warnings.len(), 1, "one duplicate warning expected");
        assert_eq!(report.errors.len(), 1, "one required-duplicate error expected");
        assert!(report.has_errors());

        let snapshot = cfg.to_immutable();
        assert!(snapshot.is_err(), "to_immutable must refuse invalid configs");
    }

    #[test]
    fn blank_key_fields_error_per_entry() {
        let cfg = config(vec![entry("", "Id", "Bus ID"), entry("Bus", " ", "Name")]);
        let report = cfg.validate();
        assert_eq!(report.errors.len(), 2);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn to_immutable_deep_clones_entries() {
        let mut cfg = config(vec![entry("Bus", "Id", "Bus ID")]);
        let snapshot = cfg.to_immutable().expect("valid config");
        cfg.import_map[0].column_header = "changed".to_string();
        assert_eq!(snapshot.entries()[0].column_header, "Bus ID");
    }

    #[test]
    fn top_level_types_exclude_nested_groups() {
        let cfg = config(vec![
            entry("Breaker", "Id", "Device ID"),
            entry("Breaker.Trip", "Function", "Trip Function"),
            entry("Bus", "Id", "Bus ID"),
        ]);
        let snapshot = cfg.to_immutable().expect("valid config");
        assert_eq!(snapshot.top_level_types(), vec!["Breaker", "Bus"]);
        // Nested entries still belong to their parent type.
        assert_eq!(snapshot.entries_for("Breaker").len(), 2);
        // But do not contribute headers to signature scoring.
        assert_eq!(snapshot.declared_headers_for("Breaker").len(), 1);
    }

    #[test]
    fn field_name_rule() {
        assert!(is_valid_field_name("TargetType"));
        assert!(is_valid_field_name("$schema"));
        assert!(!is_valid_field_name("targetType"));
        assert!(!is_valid_field_name("Target_Type"));
        assert!(!is_valid_field_name(""));
    }

    #[test]
    fn load_rejects_lowercase_field_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("map.json");
        std::fs::write(
            &path,
            r#"{"SoftwareVersion":"24.1","importMap":[]}"#,
        )
        .expect("write config");

        let error = MappingConfiguration::load(&path).expect_err("must reject");
        assert!(matches!(error, ModelError::FieldName { ref name } if name == "importMap"));
    }

    #[test]
    fn load_round_trips_aliases_and_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("map.json");
        std::fs::write(
            &path,
            r#"{
                "$schema": "https://example.invalid/mapping.schema.json",
                "SoftwareVersion": "24.1",
                "MapVersion": "rev3",
                "ImportMap": [
                    {
                        "TargetType": "Bus",
                        "PropertyName": "Id",
                        "ColumnHeader": "Bus ID",
                        "Required": true,
                        "Severity": "Error",
                        "DefaultValue": "UNKNOWN",
                        "Aliases": ["Bus Identifier", "ID"]
                    }
                ]
            }"#,
        )
        .expect("write config");

        let cfg = MappingConfiguration::load(&path).expect("load");
        assert_eq!(cfg.software_version, "24.1");
        assert_eq!(cfg.map_version.as_deref(), Some("rev3"));
        let e = &cfg.import_map[0];
        assert!(e.required);
        assert_eq!(e.severity, Severity::Error);
        assert_eq!(e.default_value.as_deref(), Some("UNKNOWN"));
        assert_eq!(e.aliases, vec!["Bus Identifier", "ID"]);

        let out = dir.path().join("saved.json");
        cfg.save(&out).expect("save");
        let reloaded = MappingConfiguration::load(&out).expect("reload");
        assert_eq!(reloaded.import_map[0].aliases, cfg.import_map[0].aliases);
    }
}
