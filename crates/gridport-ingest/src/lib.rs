//! Gridport source readers.
//!
//! Turns CSV files and Excel workbooks into ordered raw row tables
//! ([`SourceUnit`]) for the section detector to scan. Readers classify
//! nothing: header detection and typing live in `gridport-core`.

pub mod csv_rows;
pub mod error;
pub mod source;
pub mod workbook;

pub use csv_rows::read_csv_unit;
pub use error::{IngestError, Result};
pub use source::{SourceUnit, read_source};
pub use workbook::read_workbook_units;
