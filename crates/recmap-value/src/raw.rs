//! Raw record access
//!
//! Source records are heterogeneous: plain maps, parsed JSON objects,
//! or caller types carrying their values as struct fields. [`Raw`] is
//! the single keyed-lookup seam the mapping engine resolves values
//! through; attribute-bearing types participate by implementing it.

use crate::Datum;
use std::collections::{BTreeMap, HashMap};

/// Keyed lookup on a raw source record
///
/// A miss returns `None`; the mapping layer decides whether an absent
/// value is acceptable.
pub trait Raw {
    /// Look up the datum stored under `key`
    fn get(&self, key: &str) -> Option<Datum>;
}

impl Raw for BTreeMap<String, Datum> {
    fn get(&self, key: &str) -> Option<Datum> {
        BTreeMap::get(self, key).cloned()
    }
}

impl Raw for HashMap<String, Datum> {
    fn get(&self, key: &str) -> Option<Datum> {
        HashMap::get(self, key).cloned()
    }
}

impl Raw for serde_json::Map<String, serde_json::Value> {
    fn get(&self, key: &str) -> Option<Datum> {
        serde_json::Map::get(self, key).map(|v| Datum::from(v.clone()))
    }
}

impl Raw for serde_json::Value {
    /// Keyed lookup on a JSON object; non-objects never resolve a key.
    fn get(&self, key: &str) -> Option<Datum> {
        self.as_object().and_then(|map| Raw::get(map, key))
    }
}

impl<R: Raw + ?Sized> Raw for &R {
    fn get(&self, key: &str) -> Option<Datum> {
        (**self).get(key)
    }
}

impl<R: Raw + ?Sized> Raw for Box<R> {
    fn get(&self, key: &str) -> Option<Datum> {
        (**self).get(key)
    }
}
