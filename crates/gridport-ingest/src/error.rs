use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("source file not found: {path}")]
    FileNotFound { path: PathBuf },
    #[error("unsupported source extension: {path} (expected .csv, .xlsx, or .xls)")]
    UnsupportedExtension { path: PathBuf },
    #[error("failed to read csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("failed to read worksheet `{sheet}` in {path}: {source}")]
    Worksheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;
