//! Result types passed from commands to the summary printer.

use std::path::PathBuf;

use gridport_core::ImportSummary;
use gridport_model::ValidationResult;

/// Outcome of importing one source file.
pub struct FileOutcome {
    pub source: PathBuf,
    pub summary: ImportSummary,
}

/// Everything an `import` invocation produced.
pub struct ImportReport {
    pub files: Vec<FileOutcome>,
    /// Final record count per type after every file was imported.
    pub store_counts: Vec<(&'static str, usize)>,
    pub total_records: usize,
    /// Where the store JSON was written, when requested.
    pub out: Option<PathBuf>,
}

/// Outcome of validating a mapping configuration.
pub struct ValidationReport {
    pub mapping: PathBuf,
    pub entry_count: usize,
    pub result: ValidationResult,
}
