//! CSV source reading.

use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};
use crate::source::SourceUnit;

/// Read one CSV file as a single source unit.
///
/// The reader is non-header and flexible: vendor exports interleave header
/// rows, data rows, and ragged blank rows, and classifying them is the
/// section detector's job, not the reader's. Cell text is preserved
/// verbatim; only a leading BOM is stripped.
pub fn read_csv_unit(path: &Path) -> Result<SourceUnit> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if rows.is_empty()
            && let Some(first) = row.first_mut()
        {
            *first = first.trim_start_matches('\u{feff}').to_string();
        }
        rows.push(row);
    }

    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("csv")
        .to_string();

    Ok(SourceUnit { name, rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("feeder.csv");
        std::fs::write(&path, contents).expect("write csv");
        (dir, path)
    }

    #[test]
    fn reads_all_rows_without_classifying() {
        let (_dir, path) = write_csv("Bus ID,Base kV\nB1,13.8\n,,\nB2,4.16\n");
        let unit = read_csv_unit(&path).expect("read csv");

        assert_eq!(unit.name, "feeder");
        assert_eq!(unit.rows.len(), 4);
        assert_eq!(unit.rows[1], vec!["B1", "13.8"]);
        // Ragged blank rows are preserved for the detector to skip.
        assert!(unit.rows[2].iter().all(|cell| cell.is_empty()));
    }

    #[test]
    fn cells_are_verbatim_and_bom_is_stripped() {
        let (_dir, path) = write_csv("\u{feff}Bus ID, Name \nB1, Main Bus \n");
        let unit = read_csv_unit(&path).expect("read csv");

        assert_eq!(unit.rows[0][0], "Bus ID");
        // Data cells keep their surrounding whitespace.
        assert_eq!(unit.rows[1][1], " Main Bus ");
    }
}
