//! Source units: ordered raw rows from one CSV file or one worksheet.

use std::path::Path;

use tracing::debug;

use crate::csv_rows::read_csv_unit;
use crate::error::{IngestError, Result};
use crate::workbook::read_workbook_units;

/// One unit of ordered raw rows the import engine scans for sections.
///
/// A CSV file yields exactly one unit; a workbook yields one per worksheet.
/// Cells are kept verbatim apart from BOM stripping; header trimming is the
/// section detector's concern.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// File stem for CSV sources, worksheet name for workbooks.
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Read every source unit of a file, dispatching on its extension.
///
/// `sheet_allowed` filters workbook worksheets by name; it is ignored for
/// CSV sources, which are always a single unit.
pub fn read_source(path: &Path, sheet_allowed: &dyn Fn(&str) -> bool) -> Result<Vec<SourceUnit>> {
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let units = match extension.as_str() {
        "csv" => vec![read_csv_unit(path)?],
        "xlsx" | "xlsm" | "xls" => read_workbook_units(path, sheet_allowed)?,
        _ => {
            return Err(IngestError::UnsupportedExtension {
                path: path.to_path_buf(),
            });
        }
    };

    debug!(
        path = %path.display(),
        units = units.len(),
        "source read"
    );
    Ok(units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_a_structural_error() {
        let error = read_source(Path::new("/no/such/file.csv"), &|_| true).expect_err("must fail");
        assert!(matches!(error, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("export.parquet");
        std::fs::write(&path, b"not tabular").expect("write file");

        let error = read_source(&path, &|_| true).expect_err("must fail");
        assert!(matches!(error, IngestError::UnsupportedExtension { .. }));
    }
}
