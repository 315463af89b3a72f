//! Import orchestration.
//!
//! Drives the section detector over every unit of a source file, applies
//! the configuration-version check, and aggregates the per-call summary.
//! A [`DataStore`] accumulates across sequential calls, so everything in an
//! [`ImportSummary`] is a delta against the store's state at the start of
//! the call, not an absolute total.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use gridport_ingest::{SourceUnit, read_source};
use gridport_model::{DataStore, ImmutableMappingConfiguration, ImportOptions, Severity};
use serde::Serialize;
use tracing::info;

use crate::error::{ImportError, Result};
use crate::log::ImportLogger;
use crate::registry::TypeRegistry;
use crate::section::SectionDetector;

/// Per-call aggregate counters and header observations.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportSummary {
    /// Records inserted this call, per type name.
    pub imported: BTreeMap<String, usize>,
    /// Rows discarded this call because their key already existed.
    pub duplicates: BTreeMap<String, usize>,
    /// Union of declared headers absent from their sections, verbatim.
    pub missing_headers: BTreeSet<String>,
    /// Subset of `missing_headers` that were required at error severity.
    pub missing_required: BTreeSet<String>,
    /// Every header cell seen in any header row, lowercased.
    pub observed_headers: BTreeSet<String>,
    pub skipped_blank_identifiers: usize,
    pub known_sections: usize,
    pub unknown_sections: usize,
    /// Unit names processed, in order.
    pub units: Vec<String>,
}

impl ImportSummary {
    pub fn total_imported(&self) -> usize {
        self.imported.values().sum()
    }

    pub fn total_duplicates(&self) -> usize {
        self.duplicates.values().sum()
    }
}

/// One configured import engine.
///
/// An `Importer` borrows its immutable configuration, so several importers
/// may run in parallel over the same snapshot as long as each call gets its
/// own target store.
pub struct Importer<'a> {
    config: &'a ImmutableMappingConfiguration,
    registry: TypeRegistry,
    options: ImportOptions,
}

impl<'a> Importer<'a> {
    pub fn new(config: &'a ImmutableMappingConfiguration, options: ImportOptions) -> Self {
        Self {
            config,
            registry: TypeRegistry::with_defaults(),
            options,
        }
    }

    /// Import one source file (CSV or workbook) into `store`.
    pub fn import_path(
        &self,
        path: &Path,
        store: &mut DataStore,
        logger: &mut dyn ImportLogger,
    ) -> Result<ImportSummary> {
        let allowed = |sheet: &str| self.options.sheet_allowed(sheet);
        let units = read_source(path, &allowed)?;
        logger.info(
            "import",
            &format!("importing {}", path.display()),
            Some(&format!("{} unit(s)", units.len())),
        );
        self.import_units(&units, store, logger)
    }

    /// Import already-read source units into `store`.
    pub fn import_units(
        &self,
        units: &[SourceUnit],
        store: &mut DataStore,
        logger: &mut dyn ImportLogger,
    ) -> Result<ImportSummary> {
        self.check_version(store, logger);

        let mut summary = ImportSummary::default();
        for unit in units {
            summary.units.push(unit.name.clone());
            let mut detector = SectionDetector::new(self.config, &self.registry, &unit.name);
            for row in &unit.rows {
                detector.process_row(row, store, &mut summary, logger);
            }
        }

        for header in &summary.missing_headers {
            logger.info("import", &format!("declared header never found: {header}"), None);
        }

        if self.options.strict_missing_required_headers {
            let unobserved = self.required_headers_not_observed(&summary);
            if !unobserved.is_empty() {
                logger.error(
                    "import",
                    &format!("required headers never observed: {}", unobserved.join(", ")),
                    None,
                );
                return Err(ImportError::MissingRequiredHeaders {
                    headers: unobserved,
                });
            }
        }

        info!(
            imported = summary.total_imported(),
            duplicates = summary.total_duplicates(),
            sections = summary.known_sections,
            "import call finished"
        );
        for (type_name, count) in &summary.imported {
            logger.info(
                "import",
                &format!("imported {count} {type_name} record(s)"),
                None,
            );
        }
        for (type_name, count) in &summary.duplicates {
            logger.info(
                "import",
                &format!("discarded {count} duplicate {type_name} row(s)"),
                None,
            );
        }
        Ok(summary)
    }

    /// Record the configuration's compatibility tag on first use; warn when
    /// a later call arrives with a different one.
    fn check_version(&self, store: &mut DataStore, logger: &mut dyn ImportLogger) {
        let declared = self.config.software_version();
        match &store.software_version {
            None => store.software_version = Some(declared.to_string()),
            Some(recorded) if recorded != declared => {
                logger.info(
                    "version",
                    &format!(
                        "configuration targets version {declared} but store was populated with {recorded}"
                    ),
                    None,
                );
            }
            Some(_) => {}
        }
    }

    /// Required error-severity headers that no header row of the call
    /// contained, verbatim as declared.
    fn required_headers_not_observed(&self, summary: &ImportSummary) -> Vec<String> {
        let mut unobserved = BTreeSet::new();
        for entry in self.config.entries() {
            if entry.required
                && entry.severity == Severity::Error
                && !summary
                    .observed_headers
                    .contains(&entry.column_header.trim().to_lowercase())
            {
                unobserved.insert(entry.column_header.clone());
            }
        }
        unobserved.into_iter().collect()
    }
}
