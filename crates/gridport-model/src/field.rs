//! Field dispatch tables.
//!
//! Mapping entries name target fields by string. Instead of runtime
//! reflection, every record type declares a table of [`FieldSpec`] entries
//! built once at startup: the property name, its coercion class, and a
//! setter. Unknown property names surface as diagnostics rather than silent
//! drops.

/// The coercion class of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Assigned verbatim.
    Text,
    /// Tolerant vendor-boolean coercion.
    Boolean,
    /// Parsed as a whole number; left unset on parse failure.
    Integer,
    /// Parsed as a real number; left unset on parse failure.
    Real,
    /// Must case-insensitively match a declared member; unset otherwise.
    Enumerated(&'static [&'static str]),
}

impl FieldKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Boolean => "boolean",
            FieldKind::Integer => "integer",
            FieldKind::Real => "real",
            FieldKind::Enumerated(_) => "enumerated",
        }
    }
}

/// A coerced cell value ready for assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Boolean(bool),
    Integer(i64),
    Real(f64),
    /// Canonical member spelling from the field's declared enumeration.
    Enumerated(&'static str),
}

/// One row of a record type's dispatch table.
pub struct FieldSpec<R> {
    /// Property name as mapping entries spell it; dot-qualified for nested
    /// groups (e.g. `Trip.PickupAmps`).
    pub name: &'static str,
    pub kind: FieldKind,
    pub assign: fn(&mut R, FieldValue),
}

impl<R> FieldSpec<R> {
    /// Look up a spec by property path, case-insensitively.
    pub fn find<'a>(specs: &'a [FieldSpec<R>], property_path: &str) -> Option<&'a FieldSpec<R>> {
        specs
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(property_path))
    }
}
