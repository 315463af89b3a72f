//! Row population: one typed record from one data row.

use std::collections::BTreeSet;

use gridport_model::{FieldKind, FieldSpec, FieldValue, MappingEntry, RecordType, Severity};

use crate::header::HeaderIndex;
use crate::log::ImportLogger;

/// Vendor spellings accepted as `true`. `adjustable`/`adj` come from trip
/// unit exports that record adjustability in a yes/no column.
const TRUE_TOKENS: &[&str] = &["true", "t", "yes", "y", "1", "x", "adjustable", "adj"];
const FALSE_TOKENS: &[&str] = &["false", "f", "no", "n", "0", "fixed"];

/// Where in the source a row came from, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub unit: &'a str,
    /// 1-based row number within the source unit.
    pub row_number: usize,
}

/// One populated record plus the per-row header bookkeeping the
/// orchestrator aggregates.
#[derive(Debug)]
pub struct PopulatedRow<R> {
    pub record: R,
    /// Declared headers of this type absent from the section's header row.
    pub missing_headers: Vec<String>,
    /// The subset of missing headers that are Required with Error severity.
    pub missing_required: Vec<String>,
}

/// Build one record of type `R` from `row`.
///
/// `entries` are the mapping entries for `R`'s top-level type, nested-group
/// entries included. Field-level problems never abort the row: absent
/// columns fall back to declared defaults (unless the entry is
/// Error-severity), unparseable cells leave the field unset, and unknown
/// tokens or properties are logged at Verbose with row and column context.
pub fn populate<R: RecordType>(
    entries: &[&MappingEntry],
    row: &[String],
    headers: &HeaderIndex,
    logger: &mut dyn ImportLogger,
    context: RowContext<'_>,
) -> PopulatedRow<R> {
    let mut populated = PopulatedRow {
        record: R::default(),
        missing_headers: Vec::new(),
        missing_required: Vec::new(),
    };

    let mut seen = BTreeSet::new();
    for entry in entries {
        // Duplicate bindings for one property are a validation warning, and
        // the first occurrence is the one honored.
        if !seen.insert(entry.identity()) {
            continue;
        }
        let path = property_path(entry);
        let Some(spec) = FieldSpec::find(R::field_specs(), &path) else {
            logger.verbose(
                "populate",
                &format!(
                    "unknown property {}.{path} named by the mapping configuration",
                    R::TYPE_NAME
                ),
                Some(&format!("unit {}, row {}", context.unit, context.row_number)),
            );
            continue;
        };

        match headers.column(&entry.column_header) {
            None => {
                populated.missing_headers.push(entry.column_header.clone());
                if entry.required && entry.severity == Severity::Error {
                    populated.missing_required.push(entry.column_header.clone());
                } else if let Some(default) = &entry.default_value
                    && entry.severity != Severity::Error
                {
                    assign_cell(&mut populated.record, spec, default, logger, &context);
                }
            }
            Some(column) => {
                let raw = row.get(column).map(String::as_str).unwrap_or("");
                assign_cell(&mut populated.record, spec, raw, logger, &context);
            }
        }
    }

    populated
}

/// Effective property path of an entry: nested-group entries contribute
/// their group name (`Breaker.Trip` + `Function` -> `Trip.Function`).
fn property_path(entry: &MappingEntry) -> String {
    match entry.target_type.split_once('.') {
        Some((_, group)) => format!("{}.{}", group, entry.property_name),
        None => entry.property_name.clone(),
    }
}

fn assign_cell<R>(
    record: &mut R,
    spec: &FieldSpec<R>,
    raw: &str,
    logger: &mut dyn ImportLogger,
    context: &RowContext<'_>,
) {
    let (value, note) = coerce(spec.kind, raw);
    if let Some(note) = note {
        logger.verbose(
            "populate",
            &note,
            Some(&format!(
                "unit {}, row {}, field {}",
                context.unit, context.row_number, spec.name
            )),
        );
    }
    if let Some(value) = value {
        (spec.assign)(record, value);
    }
}

/// Coerce a raw cell into a field value.
///
/// Returns the value to assign (or `None` to leave the field unset) and an
/// optional note for the verbose diagnostic stream.
fn coerce(kind: FieldKind, raw: &str) -> (Option<FieldValue>, Option<String>) {
    match kind {
        FieldKind::Text => (Some(FieldValue::Text(raw.to_string())), None),
        FieldKind::Boolean => coerce_boolean(raw),
        FieldKind::Integer => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return (None, None);
            }
            match trimmed.parse::<i64>() {
                Ok(number) => (Some(FieldValue::Integer(number)), None),
                Err(_) => (None, Some(format!("`{raw}` is not an integer, field left unset"))),
            }
        }
        FieldKind::Real => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return (None, None);
            }
            match trimmed.parse::<f64>() {
                Ok(number) => (Some(FieldValue::Real(number)), None),
                Err(_) => (None, Some(format!("`{raw}` is not a number, field left unset"))),
            }
        }
        FieldKind::Enumerated(members) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return (None, None);
            }
            match members
                .iter()
                .find(|member| member.eq_ignore_ascii_case(trimmed))
            {
                Some(member) => (Some(FieldValue::Enumerated(member)), None),
                None => (
                    None,
                    Some(format!("`{raw}` matches no enumeration member, field left unset")),
                ),
            }
        }
    }
}

/// Tolerant vendor-boolean coercion.
///
/// Blank and unrecognized tokens both coerce to `false`: vendor exports
/// spell booleans too inconsistently to reject rows over them. Unknown
/// tokens are surfaced at Verbose so typos stay discoverable.
fn coerce_boolean(raw: &str) -> (Option<FieldValue>, Option<String>) {
    let token = raw.trim().to_lowercase();
    if token.is_empty() {
        return (Some(FieldValue::Boolean(false)), None);
    }
    if TRUE_TOKENS.contains(&token.as_str()) {
        return (Some(FieldValue::Boolean(true)), None);
    }
    if FALSE_TOKENS.contains(&token.as_str()) {
        return (Some(FieldValue::Boolean(false)), None);
    }
    (
        Some(FieldValue::Boolean(false)),
        Some(format!("unrecognized boolean token `{raw}` treated as false")),
    )
}
