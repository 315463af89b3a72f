//! Section and signature detection.
//!
//! Scans the ordered rows of one source unit, telling header rows apart
//! from data rows and deciding which declared record type a section
//! belongs to. Vendor exports stack unrelated sections in one sheet and
//! reuse most column names across device classes, so activation is decided
//! by proportional header overlap plus presence of the candidate type's
//! identifier header, never by raw overlap alone.

use std::collections::BTreeSet;

use gridport_model::{DataStore, ImmutableMappingConfiguration, MappingEntry};
use tracing::debug;

use crate::header::HeaderIndex;
use crate::import::ImportSummary;
use crate::log::ImportLogger;
use crate::populate::RowContext;
use crate::registry::{TypeBinding, TypeRegistry};

/// Minimum share of a type's declared headers that must be present for the
/// type to stay a candidate.
const MIN_OVERLAP: f64 = 0.30;
/// Cells that must match declared headers for a row to classify as a
/// header row (relaxed to one for the first row of a unit).
const HEADER_MATCHES_NEEDED: usize = 2;

enum SectionState<'a> {
    ScanningForHeader,
    InKnownSection(ActiveSection<'a>),
    InUnknownSection,
}

struct ActiveSection<'a> {
    binding: &'a dyn TypeBinding,
    entries: Vec<&'a MappingEntry>,
    headers: HeaderIndex,
    identifier_column: usize,
}

/// State machine over the rows of one source unit.
pub(crate) struct SectionDetector<'a> {
    config: &'a ImmutableMappingConfiguration,
    registry: &'a TypeRegistry,
    declared_headers: BTreeSet<String>,
    unit_name: &'a str,
    state: SectionState<'a>,
    row_number: usize,
    nonblank_rows_seen: usize,
}

impl<'a> SectionDetector<'a> {
    pub fn new(
        config: &'a ImmutableMappingConfiguration,
        registry: &'a TypeRegistry,
        unit_name: &'a str,
    ) -> Self {
        Self {
            config,
            registry,
            declared_headers: config.all_declared_headers(),
            unit_name,
            state: SectionState::ScanningForHeader,
            row_number: 0,
            nonblank_rows_seen: 0,
        }
    }

    /// Feed the next row of the unit through the machine.
    pub fn process_row(
        &mut self,
        row: &[String],
        store: &mut DataStore,
        summary: &mut ImportSummary,
        logger: &mut dyn ImportLogger,
    ) {
        self.row_number += 1;

        // Blank rows are layout, not content.
        if row.iter().all(|cell| cell.trim().is_empty()) {
            return;
        }

        let header_matches = row
            .iter()
            .filter(|cell| self.declared_headers.contains(&cell.trim().to_lowercase()))
            .count();
        let needed = if self.nonblank_rows_seen == 0 {
            // Short files may open directly with a one-column section.
            1
        } else {
            HEADER_MATCHES_NEEDED
        };
        self.nonblank_rows_seen += 1;

        if header_matches >= needed {
            self.enter_section(row, summary, logger);
            return;
        }

        match &self.state {
            SectionState::ScanningForHeader | SectionState::InUnknownSection => {}
            SectionState::InKnownSection(section) => {
                self.populate_data_row(section, row, store, summary, logger);
            }
        }
    }

    /// A header row was detected: pick the record type it activates.
    fn enter_section(
        &mut self,
        row: &[String],
        summary: &mut ImportSummary,
        logger: &mut dyn ImportLogger,
    ) {
        let headers = HeaderIndex::from_row(row);
        summary
            .observed_headers
            .extend(headers.headers().map(str::to_string));

        let mut candidates: Vec<Candidate<'a>> = Vec::new();
        for type_name in self.config.top_level_types() {
            let Some(binding) = self.registry.find(type_name) else {
                logger.verbose(
                    "detect",
                    &format!("mapping configuration declares unknown record type {type_name}"),
                    Some(&format!("unit {}", self.unit_name)),
                );
                continue;
            };
            let declared = self.config.declared_headers_for(type_name);
            if declared.is_empty() {
                continue;
            }
            let matched = declared
                .iter()
                .filter(|header| headers.contains(header))
                .count();
            let overlap = matched as f64 / declared.len() as f64;
            if overlap >= MIN_OVERLAP {
                candidates.push(Candidate {
                    binding,
                    matched,
                    overlap,
                });
            }
        }

        // Absolute match count first, overlap percentage second: a type
        // matching 8 of 10 headers beats one matching 3 of 3.
        candidates.sort_by(|a, b| {
            b.matched
                .cmp(&a.matched)
                .then_with(|| {
                    b.overlap
                        .partial_cmp(&a.overlap)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.binding.name().cmp(b.binding.name()))
        });

        let Some(best) = candidates.first() else {
            self.to_unknown_section(
                summary,
                logger,
                &format!(
                    "header row at {} row {} matches no declared record type",
                    self.unit_name, self.row_number
                ),
            );
            return;
        };

        let type_name = best.binding.name();
        let identifier_header = self
            .config
            .identifier_header_for(type_name, best.binding.identifier_property());
        let identifier_column =
            identifier_header.and_then(|header| headers.column(header));

        let Some(identifier_column) = identifier_column else {
            // Plausible but unusable: without the identifier column no key
            // can be formed, so activating would corrupt the store.
            self.to_unknown_section(
                summary,
                logger,
                &format!(
                    "section at {} row {} scores {:.0}% for type {type_name} but its identifier header is missing",
                    self.unit_name,
                    self.row_number,
                    best.overlap * 100.0
                ),
            );
            return;
        };

        debug!(
            unit = self.unit_name,
            row = self.row_number,
            r#type = type_name,
            matched = best.matched,
            overlap = best.overlap,
            "section activated"
        );
        logger.info(
            "detect",
            &format!(
                "section activated for type {type_name} ({} headers, {:.0}% overlap)",
                best.matched,
                best.overlap * 100.0
            ),
            Some(&format!("unit {}, row {}", self.unit_name, self.row_number)),
        );
        summary.known_sections += 1;
        self.state = SectionState::InKnownSection(ActiveSection {
            binding: best.binding,
            entries: self.config.entries_for(type_name),
            headers,
            identifier_column,
        });
    }

    fn populate_data_row(
        &self,
        section: &ActiveSection<'a>,
        row: &[String],
        store: &mut DataStore,
        summary: &mut ImportSummary,
        logger: &mut dyn ImportLogger,
    ) {
        let identifier = row
            .get(section.identifier_column)
            .map(String::as_str)
            .unwrap_or("");
        if identifier.trim().is_empty() {
            // Subtotal and annotation rows carry no identifier; not an error.
            summary.skipped_blank_identifiers += 1;
            logger.verbose(
                "detect",
                "row skipped: blank identifier",
                Some(&format!("unit {}, row {}", self.unit_name, self.row_number)),
            );
            return;
        }

        let context = RowContext {
            unit: self.unit_name,
            row_number: self.row_number,
        };
        let result = section.binding.populate_into(
            store,
            &section.entries,
            row,
            &section.headers,
            logger,
            context,
        );

        let type_name = section.binding.name();
        summary
            .missing_headers
            .extend(result.missing_headers.iter().cloned());
        summary
            .missing_required
            .extend(result.missing_required.iter().cloned());
        if result.inserted {
            *summary.imported.entry(type_name.to_string()).or_insert(0) += 1;
        } else {
            *summary.duplicates.entry(type_name.to_string()).or_insert(0) += 1;
            logger.info(
                "import",
                &format!("duplicate {type_name} key `{}`: first occurrence kept", result.key),
                Some(&format!("unit {}, row {}", self.unit_name, self.row_number)),
            );
        }
    }

    fn to_unknown_section(
        &mut self,
        summary: &mut ImportSummary,
        logger: &mut dyn ImportLogger,
        message: &str,
    ) {
        // One diagnostic per transition, never one per ignored row.
        summary.unknown_sections += 1;
        logger.info("detect", message, None);
        self.state = SectionState::InUnknownSection;
    }
}

struct Candidate<'a> {
    binding: &'a dyn TypeBinding,
    matched: usize,
    overlap: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridport_model::{MappingConfiguration, MappingEntry, Severity};

    use crate::log::MemoryLogger;

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

    /// Breaker and Fuse deliberately share `AC/DC` and `Status`.
    fn ambiguous_config() -> ImmutableMappingConfiguration {
        let config = MappingConfiguration {
            software_version: "24.1".to_string(),
            map_version: None,
            import_map: vec![
                entry("Breaker", "Id", "Device ID"),
                entry("Breaker", "Scenario", "Scenario"),
                entry("Breaker", "CurrentType", "AC/DC"),
                entry("Breaker", "InService", "Status"),
                entry("Breaker", "FrameAmps", "Frame Amps"),
                entry("Fuse", "Id", "Fuse ID"),
                entry("Fuse", "Size", "Fuse Size"),
                entry("Fuse", "Model", "Model"),
                entry("Fuse", "Manufacturer", "Mfr"),
                entry("Fuse", "CurrentType", "AC/DC"),
                entry("Fuse", "InService", "Status"),
                entry("Fuse", "BaseKv", "Base kV"),
                entry("Fuse", "Scenario", "Fuse Scenario"),
            ],
        };
        config.to_immutable().expect("valid config")
    }

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn run_rows(
        config: &ImmutableMappingConfiguration,
        rows: &[Vec<String>],
    ) -> (DataStore, ImportSummary, MemoryLogger) {
        let registry = TypeRegistry::with_defaults();
        let mut store = DataStore::new();
        let mut summary = ImportSummary::default();
        let mut logger = MemoryLogger::new();
        let mut detector = SectionDetector::new(config, &registry, "sheet1");
        for row in rows {
            detector.process_row(row, &mut store, &mut summary, &mut logger);
        }
        (store, summary, logger)
    }

    #[test]
    fn high_overlap_type_wins_and_low_overlap_type_is_discarded() {
        let config = ambiguous_config();
        // 4/5 = 80% of Breaker's headers, 2/8 = 25% of Fuse's.
        let rows = vec![
            cells(&["note", "exported 2026-05-11"]),
            cells(&["Device ID", "Scenario", "AC/DC", "Status"]),
            cells(&["CB-1", "Summer", "AC", "Yes"]),
            cells(&["CB-2", "Summer", "DC", "No"]),
        ];
        let (store, summary, _) = run_rows(&config, &rows);

        assert_eq!(store.breakers.len(), 2, "Breaker section must activate");
        assert_eq!(store.fuses.len(), 0, "Fuse must never activate at 25% overlap");
        assert_eq!(summary.known_sections, 1);
        assert_eq!(summary.imported.get("Breaker"), Some(&2));
    }

    #[test]
    fn missing_identifier_header_blocks_activation() {
        let config = ambiguous_config();
        // 80% of Breaker's headers but `Device ID` itself is absent.
        let rows = vec![
            cells(&["Scenario", "AC/DC", "Status", "Frame Amps"]),
            cells(&["Summer", "AC", "Yes", "225"]),
        ];
        let (store, summary, logger) = run_rows(&config, &rows);

        assert_eq!(store.total_records(), 0);
        assert_eq!(summary.unknown_sections, 1);
        assert!(
            logger
                .messages_at(crate::log::DiagLevel::Info)
                .iter()
                .any(|message| message.contains("identifier header is missing")),
            "unusable section must be diagnosed"
        );
    }

    #[test]
    fn first_row_of_a_unit_classifies_with_a_single_match() {
        let config = MappingConfiguration {
            software_version: "24.1".to_string(),
            map_version: None,
            import_map: vec![
                entry("Bus", "Id", "Bus ID"),
                entry("Bus", "BaseKv", "Base kV"),
                entry("Bus", "Zone", "Zone"),
            ],
        }
        .to_immutable()
        .expect("valid config");

        let rows = vec![cells(&["Bus ID"]), cells(&["B1"]), cells(&["B2"])];
        let (store, _, _) = run_rows(&config, &rows);
        assert_eq!(store.buses.len(), 2);
    }

    #[test]
    fn blank_rows_do_not_disturb_an_active_section() {
        let config = ambiguous_config();
        let rows = vec![
            cells(&["Device ID", "Scenario", "AC/DC", "Status", "Frame Amps"]),
            cells(&["CB-1", "Summer", "AC", "Yes", "225"]),
            cells(&["", "", "", "", ""]),
            cells(&["CB-2", "Summer", "AC", "Yes", "400"]),
        ];
        let (store, _, _) = run_rows(&config, &rows);
        assert_eq!(store.breakers.len(), 2);
    }

    #[test]
    fn blank_identifier_rows_are_skipped_without_error() {
        let config = ambiguous_config();
        let rows = vec![
            cells(&["Device ID", "Scenario", "AC/DC", "Status"]),
            cells(&["", "Summer", "AC", "Yes"]),
            cells(&["CB-9", "Summer", "AC", "Yes"]),
        ];
        let (store, summary, _) = run_rows(&config, &rows);
        assert_eq!(store.breakers.len(), 1);
        assert_eq!(summary.skipped_blank_identifiers, 1);
    }

    #[test]
    fn a_second_header_row_starts_a_new_section() {
        let config = MappingConfiguration {
            software_version: "24.1".to_string(),
            map_version: None,
            import_map: vec![
                entry("Bus", "Id", "Bus ID"),
                entry("Bus", "BaseKv", "Base kV"),
                entry("Breaker", "Id", "Device ID"),
                entry("Breaker", "Scenario", "Scenario"),
            ],
        }
        .to_immutable()
        .expect("valid config");

        let rows = vec![
            cells(&["Bus ID", "Base kV"]),
            cells(&["B1", "13.8"]),
            cells(&["Device ID", "Scenario"]),
            cells(&["CB-1", "Summer"]),
        ];
        let (store, summary, _) = run_rows(&config, &rows);

        assert_eq!(store.buses.len(), 1);
        assert_eq!(store.breakers.len(), 1);
        assert_eq!(summary.known_sections, 2);
    }

    #[test]
    fn duplicate_keys_keep_the_first_record_and_are_counted() {
        let config = ambiguous_config();
        let rows = vec![
            cells(&["Device ID", "Scenario", "AC/DC", "Status"]),
            cells(&["CB-1", "Summer", "AC", "Yes"]),
            cells(&["CB-1", "Summer", "DC", "No"]),
        ];
        let (store, summary, _) = run_rows(&config, &rows);

        assert_eq!(store.breakers.len(), 1);
        assert_eq!(summary.duplicates.get("Breaker"), Some(&1));
        let key = gridport_model::RecordKey::Pair("CB-1".into(), "Summer".into());
        assert_eq!(
            store.breakers[&key].current_type,
            Some(gridport_model::CurrentType::Ac),
            "first write must win"
        );
    }
}
