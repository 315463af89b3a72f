//! Gridport import engine.
//!
//! Section and signature detection over semi-structured source rows, typed
//! row population with tolerant coercion, and the orchestrator that drives
//! both into a keyed [`gridport_model::DataStore`].

pub mod error;
pub mod header;
pub mod import;
pub mod log;
mod populate;
mod registry;
mod section;

pub use error::{ImportError, Result};
pub use header::HeaderIndex;
pub use import::{ImportSummary, Importer};
pub use log::{DiagLevel, FileLogger, ImportLogger, LogEntry, MemoryLogger};
pub use registry::{TypeDescription, TypeRegistry};
