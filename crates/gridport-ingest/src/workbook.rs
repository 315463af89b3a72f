//! Excel workbook source reading via `calamine`.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::source::SourceUnit;

/// Read a workbook as one source unit per worksheet.
///
/// Worksheets rejected by `sheet_allowed` are skipped entirely. Cells are
/// rendered to strings the way vendor CSV exports of the same data would
/// spell them.
pub fn read_workbook_units(
    path: &Path,
    sheet_allowed: &dyn Fn(&str) -> bool,
) -> Result<Vec<SourceUnit>> {
    let mut workbook = open_workbook_auto(path).map_err(|source| IngestError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut units = Vec::new();

    for sheet_name in sheet_names {
        if !sheet_allowed(&sheet_name) {
            debug!(sheet = %sheet_name, "worksheet skipped by allow-list");
            continue;
        }

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|source| IngestError::Worksheet {
                path: path.to_path_buf(),
                sheet: sheet_name.clone(),
                source,
            })?;

        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(render_cell).collect())
            .collect();

        units.push(SourceUnit {
            name: sheet_name,
            rows,
        });
    }

    Ok(units)
}

fn render_cell(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Int(number) => number.to_string(),
        // f64 Display already prints integral values without a fraction.
        Data::Float(number) => number.to_string(),
        Data::Bool(flag) => flag.to_string(),
        Data::Error(_) => String::new(),
        Data::DateTime(datetime) => datetime.as_f64().to_string(),
        Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_render_like_csv_exports() {
        assert_eq!(render_cell(&Data::Empty), "");
        assert_eq!(render_cell(&Data::String("CB-1".to_string())), "CB-1");
        assert_eq!(render_cell(&Data::Float(480.0)), "480");
        assert_eq!(render_cell(&Data::Float(13.8)), "13.8");
        assert_eq!(render_cell(&Data::Int(3)), "3");
        assert_eq!(render_cell(&Data::Bool(true)), "true");
    }
}
