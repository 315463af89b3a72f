use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read mapping configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write mapping configuration {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse mapping configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "invalid field name `{name}` in mapping configuration: \
         field names must start with an uppercase letter and contain only letters and digits"
    )]
    FieldName { name: String },
    #[error("mapping configuration failed validation:\n  {}", errors.join("\n  "))]
    Validation { errors: Vec<String> },
}

pub type Result<T> = std::result::Result<T, ModelError>;
