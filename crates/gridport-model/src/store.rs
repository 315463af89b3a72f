//! The keyed target store an import run populates.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;

use crate::key::RecordKey;
use crate::records::{Breaker, Bus, Cable, Fuse};

/// One keyed map per declared record type.
///
/// A store accumulates across sequential import calls (several files into
/// one project). Within one store a key maps to at most one record; a second
/// row producing an existing key is a duplicate and the first write wins.
/// Insertion is not thread-safe: a store must not be shared across
/// concurrent import calls.
#[derive(Debug, Default, Serialize)]
pub struct DataStore {
    /// Compatibility tag recorded by the first import into this store.
    pub software_version: Option<String>,
    pub buses: BTreeMap<RecordKey, Bus>,
    pub breakers: BTreeMap<RecordKey, Breaker>,
    pub fuses: BTreeMap<RecordKey, Fuse>,
    pub cables: BTreeMap<RecordKey, Cable>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_records(&self) -> usize {
        self.buses.len() + self.breakers.len() + self.fuses.len() + self.cables.len()
    }

    /// Record count for a type by its declared name, case-insensitively.
    pub fn count_for(&self, type_name: &str) -> Option<usize> {
        if type_name.eq_ignore_ascii_case("Bus") {
            Some(self.buses.len())
        } else if type_name.eq_ignore_ascii_case("Breaker") {
            Some(self.breakers.len())
        } else if type_name.eq_ignore_ascii_case("Fuse") {
            Some(self.fuses.len())
        } else if type_name.eq_ignore_ascii_case("Cable") {
            Some(self.cables.len())
        } else {
            None
        }
    }
}

/// First write wins; returns `false` when the key already existed.
pub(crate) fn insert_first_wins<T>(
    map: &mut BTreeMap<RecordKey, T>,
    key: RecordKey,
    record: T,
) -> bool {
    match map.entry(key) {
        Entry::Occupied(_) => false,
        Entry::Vacant(slot) => {
            slot.insert(record);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::RecordType;

    #[test]
    fn duplicate_insert_keeps_first_write() {
        let mut store = DataStore::new();
        let first = Bus {
            id: "B1".into(),
            name: "Main".into(),
            ..Bus::default()
        };
        let second = Bus {
            id: "B1".into(),
            name: "Shadow".into(),
            ..Bus::default()
        };

        assert!(Bus::insert(&mut store, first.composite_key(), first));
        assert!(!Bus::insert(&mut store, second.composite_key(), second));
        assert_eq!(store.buses.len(), 1);
        assert_eq!(store.buses[&RecordKey::Single("B1".into())].name, "Main");
    }

    #[test]
    fn counts_by_type_name() {
        let mut store = DataStore::new();
        let bus = Bus {
            id: "B1".into(),
            ..Bus::default()
        };
        Bus::insert(&mut store, bus.composite_key(), bus);
        assert_eq!(store.count_for("bus"), Some(1));
        assert_eq!(store.count_for("Breaker"), Some(0));
        assert_eq!(store.count_for("Transformer"), None);
        assert_eq!(store.total_records(), 1);
    }

    #[test]
    fn store_serializes_keys_as_strings() {
        let mut store = DataStore::new();
        let breaker = Breaker {
            id: "CB-1".into(),
            scenario: "Summer".into(),
            ..Breaker::default()
        };
        Breaker::insert(&mut store, breaker.composite_key(), breaker);
        let json = serde_json::to_string(&store).expect("serialize store");
        assert!(json.contains("CB-1 @ Summer"));
    }
}
