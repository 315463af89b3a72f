//! Runtime registry of declared record types.
//!
//! The mapping configuration names record types by string; the registry maps
//! those names onto the statically-known types and erases the generic
//! populate/insert path behind one object-safe seam, so the detector and
//! orchestrator stay monomorphization-free.

use std::marker::PhantomData;

use gridport_model::{
    Breaker, Bus, Cable, DataStore, Fuse, KeyShape, MappingEntry, RecordKey, RecordType,
};

use crate::header::HeaderIndex;
use crate::log::ImportLogger;
use crate::populate::{PopulatedRow, RowContext, populate};

/// Outcome of populating one row for one active type.
#[derive(Debug)]
pub(crate) struct RowResult {
    /// False when the composite key already existed (duplicate, discarded).
    pub inserted: bool,
    pub key: RecordKey,
    pub missing_headers: Vec<String>,
    pub missing_required: Vec<String>,
}

pub(crate) trait TypeBinding: Send + Sync {
    fn name(&self) -> &'static str;
    fn identifier_property(&self) -> &'static str;
    fn key_shape(&self) -> KeyShape;
    fn fields(&self) -> Vec<(&'static str, &'static str)>;
    fn populate_into(
        &self,
        store: &mut DataStore,
        entries: &[&MappingEntry],
        row: &[String],
        headers: &HeaderIndex,
        logger: &mut dyn ImportLogger,
        context: RowContext<'_>,
    ) -> RowResult;
}

struct Binding<R>(PhantomData<fn() -> R>);

impl<R: RecordType> TypeBinding for Binding<R> {
    fn name(&self) -> &'static str {
        R::TYPE_NAME
    }

    fn identifier_property(&self) -> &'static str {
        R::IDENTIFIER_PROPERTY
    }

    fn key_shape(&self) -> KeyShape {
        R::key_shape()
    }

    fn fields(&self) -> Vec<(&'static str, &'static str)> {
        R::field_specs()
            .iter()
            .map(|spec| (spec.name, spec.kind.label()))
            .collect()
    }

    fn populate_into(
        &self,
        store: &mut DataStore,
        entries: &[&MappingEntry],
        row: &[String],
        headers: &HeaderIndex,
        logger: &mut dyn ImportLogger,
        context: RowContext<'_>,
    ) -> RowResult {
        let PopulatedRow {
            record,
            missing_headers,
            missing_required,
        } = populate::<R>(entries, row, headers, logger, context);
        let key = record.composite_key();
        let inserted = R::insert(store, key.clone(), record);
        RowResult {
            inserted,
            key,
            missing_headers,
            missing_required,
        }
    }
}

/// Description of one registered type, for listing and authoring tools.
#[derive(Debug, Clone)]
pub struct TypeDescription {
    pub name: &'static str,
    pub identifier_property: &'static str,
    pub key_shape: KeyShape,
    /// `(property name, kind label)` pairs, nested groups dot-qualified.
    pub fields: Vec<(&'static str, &'static str)>,
}

/// The set of record types an import run can populate.
pub struct TypeRegistry {
    bindings: Vec<Box<dyn TypeBinding>>,
}

impl TypeRegistry {
    /// Registry of every built-in record type.
    pub fn with_defaults() -> Self {
        Self {
            bindings: vec![
                Box::new(Binding::<Bus>(PhantomData)),
                Box::new(Binding::<Breaker>(PhantomData)),
                Box::new(Binding::<Fuse>(PhantomData)),
                Box::new(Binding::<Cable>(PhantomData)),
            ],
        }
    }

    pub(crate) fn find(&self, type_name: &str) -> Option<&dyn TypeBinding> {
        self.bindings
            .iter()
            .map(Box::as_ref)
            .find(|binding| binding.name().eq_ignore_ascii_case(type_name))
    }

    pub fn descriptions(&self) -> Vec<TypeDescription> {
        self.bindings
            .iter()
            .map(|binding| TypeDescription {
                name: binding.name(),
                identifier_property: binding.identifier_property(),
                key_shape: binding.key_shape(),
                fields: binding.fields(),
            })
            .collect()
    }

    /// Declared field names of a type, or `None` for unknown type names.
    pub fn field_names(&self, type_name: &str) -> Option<Vec<&'static str>> {
        self.find(type_name)
            .map(|binding| binding.fields().iter().map(|(name, _)| *name).collect())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_knows_the_builtin_types() {
        let registry = TypeRegistry::with_defaults();
        assert!(registry.find("bus").is_some());
        assert!(registry.find("BREAKER").is_some());
        assert!(registry.find("Transformer").is_none());
    }

    #[test]
    fn descriptions_expose_key_shapes_and_fields() {
        let registry = TypeRegistry::with_defaults();
        let descriptions = registry.descriptions();
        let cable = descriptions
            .iter()
            .find(|d| d.name == "Cable")
            .expect("cable registered");
        assert_eq!(cable.key_shape, KeyShape::Triple);
        assert!(cable.fields.iter().any(|(name, _)| *name == "Conductors"));
    }

    #[test]
    fn field_names_cover_nested_groups() {
        let registry = TypeRegistry::with_defaults();
        let fields = registry.field_names("Breaker").expect("known type");
        assert!(fields.contains(&"Trip.PickupAmps"));
    }
}
