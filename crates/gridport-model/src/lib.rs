//! Gridport data model.
//!
//! Mapping configurations and their validated immutable snapshots, the
//! declared record types with their field dispatch tables, composite keys,
//! keyed data stores, and import options.

pub mod error;
pub mod field;
pub mod key;
pub mod mapping;
pub mod options;
pub mod records;
pub mod store;

pub use error::{ModelError, Result};
pub use field::{FieldKind, FieldSpec, FieldValue};
pub use key::{KeyShape, RecordKey};
pub use mapping::{
    ImmutableMappingConfiguration, MappingConfiguration, MappingEntry, Severity, ValidationResult,
};
pub use options::ImportOptions;
pub use records::{Breaker, Bus, Cable, CurrentType, Fuse, RecordType, TripSettings};
pub use store::DataStore;
