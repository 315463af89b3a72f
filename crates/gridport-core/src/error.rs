use gridport_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// Strict-mode failure: required error-severity headers never appeared
    /// in any header row of the source.
    #[error("required headers never observed in source: {}", headers.join(", "))]
    MissingRequiredHeaders { headers: Vec<String> },
}

pub type Result<T> = std::result::Result<T, ImportError>;
