//! Declared record types and their dispatch tables.
//!
//! Each type declares its name (as mapping entries spell it in `TargetType`),
//! its identifier property (whose header must be present for a section to
//! activate), its composite-key shape, and a field table mapping property
//! names to typed setters.

use serde::{Deserialize, Serialize};

use crate::field::{FieldKind, FieldSpec, FieldValue};
use crate::key::{KeyShape, RecordKey};
use crate::store::DataStore;

/// A record type the import engine can populate and store.
pub trait RecordType: Default + Clone + Send + 'static {
    /// Name mapping entries use in `TargetType`.
    const TYPE_NAME: &'static str;
    /// Property whose mapped header must be present in a section's header
    /// row for this type to activate.
    const IDENTIFIER_PROPERTY: &'static str;

    fn key_shape() -> KeyShape;
    fn field_specs() -> &'static [FieldSpec<Self>];
    fn composite_key(&self) -> RecordKey;

    /// First-write-wins insert into the store. Returns `false` when the key
    /// was already present (the new record is discarded).
    fn insert(store: &mut DataStore, key: RecordKey, record: Self) -> bool;
    fn count(store: &DataStore) -> usize;
}

/// AC/DC classification shared by several device types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurrentType {
    Ac,
    Dc,
}

impl CurrentType {
    pub const MEMBERS: &'static [&'static str] = &["AC", "DC"];

    pub fn parse(member: &str) -> Option<Self> {
        if member.eq_ignore_ascii_case("AC") {
            Some(CurrentType::Ac)
        } else if member.eq_ignore_ascii_case("DC") {
            Some(CurrentType::Dc)
        } else {
            None
        }
    }
}

/// A bus (node) in the network model. Keyed by identifier alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: String,
    pub name: String,
    pub base_kv: Option<f64>,
    pub current_type: Option<CurrentType>,
    pub in_service: bool,
    pub zone: String,
}

impl RecordType for Bus {
    const TYPE_NAME: &'static str = "Bus";
    const IDENTIFIER_PROPERTY: &'static str = "Id";

    fn key_shape() -> KeyShape {
        KeyShape::Single
    }

    fn field_specs() -> &'static [FieldSpec<Self>] {
        const SPECS: &[FieldSpec<Bus>] = &[
            FieldSpec {
                name: "Id",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.id = text;
                    }
                },
            },
            FieldSpec {
                name: "Name",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.name = text;
                    }
                },
            },
            FieldSpec {
                name: "BaseKv",
                kind: FieldKind::Real,
                assign: |record, value| {
                    if let FieldValue::Real(real) = value {
                        record.base_kv = Some(real);
                    }
                },
            },
            FieldSpec {
                name: "CurrentType",
                kind: FieldKind::Enumerated(CurrentType::MEMBERS),
                assign: |record, value| {
                    if let FieldValue::Enumerated(member) = value {
                        record.current_type = CurrentType::parse(member);
                    }
                },
            },
            FieldSpec {
                name: "InService",
                kind: FieldKind::Boolean,
                assign: |record, value| {
                    if let FieldValue::Boolean(flag) = value {
                        record.in_service = flag;
                    }
                },
            },
            FieldSpec {
                name: "Zone",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.zone = text;
                    }
                },
            },
        ];
        SPECS
    }

    fn composite_key(&self) -> RecordKey {
        RecordKey::Single(self.id.clone())
    }

    fn insert(store: &mut DataStore, key: RecordKey, record: Self) -> bool {
        crate::store::insert_first_wins(&mut store.buses, key, record)
    }

    fn count(store: &DataStore) -> usize {
        store.buses.len()
    }
}

/// Trip-unit settings nested under a breaker (`Breaker.Trip` group).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripSettings {
    pub function: String,
    pub pickup_amps: Option<f64>,
    pub time_dial: Option<f64>,
}

/// A circuit breaker. Keyed by `(identifier, scenario)` so the same device
/// can carry different settings per study scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breaker {
    pub id: String,
    pub scenario: String,
    pub current_type: Option<CurrentType>,
    pub in_service: bool,
    pub base_kv: Option<f64>,
    pub frame_amps: Option<f64>,
    pub adjustable: bool,
    pub manufacturer: String,
    pub model: String,
    pub trip: TripSettings,
}

impl RecordType for Breaker {
    const TYPE_NAME: &'static str = "Breaker";
    const IDENTIFIER_PROPERTY: &'static str = "Id";

    fn key_shape() -> KeyShape {
        KeyShape::Pair
    }

    fn field_specs() -> &'static [FieldSpec<Self>] {
        const SPECS: &[FieldSpec<Breaker>] = &[
            FieldSpec {
                name: "Id",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.id = text;
                    }
                },
            },
            FieldSpec {
                name: "Scenario",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.scenario = text;
                    }
                },
            },
            FieldSpec {
                name: "CurrentType",
                kind: FieldKind::Enumerated(CurrentType::MEMBERS),
                assign: |record, value| {
                    if let FieldValue::Enumerated(member) = value {
                        record.current_type = CurrentType::parse(member);
                    }
                },
            },
            FieldSpec {
                name: "InService",
                kind: FieldKind::Boolean,
                assign: |record, value| {
                    if let FieldValue::Boolean(flag) = value {
                        record.in_service = flag;
                    }
                },
            },
            FieldSpec {
                name: "BaseKv",
                kind: FieldKind::Real,
                assign: |record, value| {
                    if let FieldValue::Real(real) = value {
                        record.base_kv = Some(real);
                    }
                },
            },
            FieldSpec {
                name: "FrameAmps",
                kind: FieldKind::Real,
                assign: |record, value| {
                    if let FieldValue::Real(real) = value {
                        record.frame_amps = Some(real);
                    }
                },
            },
            FieldSpec {
                name: "Adjustable",
                kind: FieldKind::Boolean,
                assign: |record, value| {
                    if let FieldValue::Boolean(flag) = value {
                        record.adjustable = flag;
                    }
                },
            },
            FieldSpec {
                name: "Manufacturer",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.manufacturer = text;
                    }
                },
            },
            FieldSpec {
                name: "Model",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.model = text;
                    }
                },
            },
            // Nested `Breaker.Trip` group.
            FieldSpec {
                name: "Trip.Function",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.trip.function = text;
                    }
                },
            },
            FieldSpec {
                name: "Trip.PickupAmps",
                kind: FieldKind::Real,
                assign: |record, value| {
                    if let FieldValue::Real(real) = value {
                        record.trip.pickup_amps = Some(real);
                    }
                },
            },
            FieldSpec {
                name: "Trip.TimeDial",
                kind: FieldKind::Real,
                assign: |record, value| {
                    if let FieldValue::Real(real) = value {
                        record.trip.time_dial = Some(real);
                    }
                },
            },
        ];
        SPECS
    }

    fn composite_key(&self) -> RecordKey {
        RecordKey::Pair(self.id.clone(), self.scenario.clone())
    }

    fn insert(store: &mut DataStore, key: RecordKey, record: Self) -> bool {
        crate::store::insert_first_wins(&mut store.breakers, key, record)
    }

    fn count(store: &DataStore) -> usize {
        store.breakers.len()
    }
}

/// A fuse. Shares most of its column vocabulary with [`Breaker`], which is
/// exactly the ambiguity signature matching has to resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fuse {
    pub id: String,
    pub scenario: String,
    pub current_type: Option<CurrentType>,
    pub in_service: bool,
    pub base_kv: Option<f64>,
    pub size: String,
    pub manufacturer: String,
    pub model: String,
}

impl RecordType for Fuse {
    const TYPE_NAME: &'static str = "Fuse";
    const IDENTIFIER_PROPERTY: &'static str = "Id";

    fn key_shape() -> KeyShape {
        KeyShape::Pair
    }

    fn field_specs() -> &'static [FieldSpec<Self>] {
        const SPECS: &[FieldSpec<Fuse>] = &[
            FieldSpec {
                name: "Id",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.id = text;
                    }
                },
            },
            FieldSpec {
                name: "Scenario",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.scenario = text;
                    }
                },
            },
            FieldSpec {
                name: "CurrentType",
                kind: FieldKind::Enumerated(CurrentType::MEMBERS),
                assign: |record, value| {
                    if let FieldValue::Enumerated(member) = value {
                        record.current_type = CurrentType::parse(member);
                    }
                },
            },
            FieldSpec {
                name: "InService",
                kind: FieldKind::Boolean,
                assign: |record, value| {
                    if let FieldValue::Boolean(flag) = value {
                        record.in_service = flag;
                    }
                },
            },
            FieldSpec {
                name: "BaseKv",
                kind: FieldKind::Real,
                assign: |record, value| {
                    if let FieldValue::Real(real) = value {
                        record.base_kv = Some(real);
                    }
                },
            },
            FieldSpec {
                name: "Size",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.size = text;
                    }
                },
            },
            FieldSpec {
                name: "Manufacturer",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.manufacturer = text;
                    }
                },
            },
            FieldSpec {
                name: "Model",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.model = text;
                    }
                },
            },
        ];
        SPECS
    }

    fn composite_key(&self) -> RecordKey {
        RecordKey::Pair(self.id.clone(), self.scenario.clone())
    }

    fn insert(store: &mut DataStore, key: RecordKey, record: Self) -> bool {
        crate::store::insert_first_wins(&mut store.fuses, key, record)
    }

    fn count(store: &DataStore) -> usize {
        store.fuses.len()
    }
}

/// A cable run. Keyed by `(identifier, from-bus, scenario)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cable {
    pub id: String,
    pub from_bus: String,
    pub to_bus: String,
    pub scenario: String,
    pub length_ft: Option<f64>,
    pub size: String,
    pub conductors: Option<i64>,
    pub in_service: bool,
}

impl RecordType for Cable {
    const TYPE_NAME: &'static str = "Cable";
    const IDENTIFIER_PROPERTY: &'static str = "Id";

    fn key_shape() -> KeyShape {
        KeyShape::Triple
    }

    fn field_specs() -> &'static [FieldSpec<Self>] {
        const SPECS: &[FieldSpec<Cable>] = &[
            FieldSpec {
                name: "Id",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.id = text;
                    }
                },
            },
            FieldSpec {
                name: "FromBus",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.from_bus = text;
                    }
                },
            },
            FieldSpec {
                name: "ToBus",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.to_bus = text;
                    }
                },
            },
            FieldSpec {
                name: "Scenario",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.scenario = text;
                    }
                },
            },
            FieldSpec {
                name: "LengthFt",
                kind: FieldKind::Real,
                assign: |record, value| {
                    if let FieldValue::Real(real) = value {
                        record.length_ft = Some(real);
                    }
                },
            },
            FieldSpec {
                name: "Size",
                kind: FieldKind::Text,
                assign: |record, value| {
                    if let FieldValue::Text(text) = value {
                        record.size = text;
                    }
                },
            },
            FieldSpec {
                name: "Conductors",
                kind: FieldKind::Integer,
                assign: |record, value| {
                    if let FieldValue::Integer(count) = value {
                        record.conductors = Some(count);
                    }
                },
            },
            FieldSpec {
                name: "InService",
                kind: FieldKind::Boolean,
                assign: |record, value| {
                    if let FieldValue::Boolean(flag) = value {
                        record.in_service = flag;
                    }
                },
            },
        ];
        SPECS
    }

    fn composite_key(&self) -> RecordKey {
        RecordKey::Triple(
            self.id.clone(),
            self.from_bus.clone(),
            self.scenario.clone(),
        )
    }

    fn insert(store: &mut DataStore, key: RecordKey, record: Self) -> bool {
        crate::store::insert_first_wins(&mut store.cables, key, record)
    }

    fn count(store: &DataStore) -> usize {
        store.cables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup_is_case_insensitive() {
        let spec = FieldSpec::find(Bus::field_specs(), "basekv").expect("known field");
        assert_eq!(spec.name, "BaseKv");
        assert!(FieldSpec::find(Bus::field_specs(), "NoSuchField").is_none());
    }

    #[test]
    fn nested_group_fields_are_dot_qualified() {
        let spec = FieldSpec::find(Breaker::field_specs(), "trip.pickupamps").expect("nested field");
        let mut breaker = Breaker::default();
        (spec.assign)(&mut breaker, FieldValue::Real(125.0));
        assert_eq!(breaker.trip.pickup_amps, Some(125.0));
    }

    #[test]
    fn enumerated_assignment_parses_canonical_member() {
        let spec = FieldSpec::find(Fuse::field_specs(), "CurrentType").expect("field");
        let mut fuse = Fuse::default();
        (spec.assign)(&mut fuse, FieldValue::Enumerated("DC"));
        assert_eq!(fuse.current_type, Some(CurrentType::Dc));
    }

    #[test]
    fn composite_keys_follow_declared_shapes() {
        let bus = Bus {
            id: "B1".into(),
            ..Bus::default()
        };
        assert_eq!(bus.composite_key(), RecordKey::Single("B1".into()));

        let cable = Cable {
            id: "C1".into(),
            from_bus: "B1".into(),
            scenario: "Base".into(),
            ..Cable::default()
        };
        assert_eq!(
            cable.composite_key(),
            RecordKey::Triple("C1".into(), "B1".into(), "Base".into())
        );
        assert_eq!(Cable::key_shape(), KeyShape::Triple);
    }

    #[test]
    fn mismatched_value_variant_is_ignored() {
        let spec = FieldSpec::find(Bus::field_specs(), "BaseKv").expect("field");
        let mut bus = Bus::default();
        (spec.assign)(&mut bus, FieldValue::Text("not a number".into()));
        assert_eq!(bus.base_kv, None);
    }
}
