//! Key/value cache for resolved waypoints.
//!
//! Provides:
//! - A string-keyed `KeyValueStore` seam so the backing store can be swapped
//! - `MemoryStore`, a process-lifetime map that never evicts
//! - Typed helpers with serde (de)serialization and standard key formats

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Minimal get/set store keyed by string.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// In-memory store shared across requests. Entries are never invalidated.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries.write().insert(key.to_string(), value);
    }
}

/// Read and decode a cached value. Undecodable entries count as misses.
pub fn get_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let data = store.get(key)?;
    match serde_json::from_str(&data) {
        Ok(value) => {
            debug!(key = key, "Cache hit");
            Some(value)
        }
        Err(e) => {
            warn!(key = key, error = %e, "Failed to deserialize cached value");
            None
        }
    }
}

/// Encode and store a value.
pub fn set_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(data) => {
            store.set(key, data);
            debug!(key = key, "Cached value");
        }
        Err(e) => warn!(key = key, error = %e, "Failed to serialize value for cache"),
    }
}

/// Cache key builders for consistent key formats.
pub mod keys {
    /// Geocoded place, keyed by the exact place name
    pub fn geo(place_name: &str) -> String {
        format!("geo:{}", place_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::itinerary::GeoPoint;

    #[test]
    fn geo_keys_are_prefixed() {
        assert_eq!(keys::geo("Shaniwar Wada, Pune"), "geo:Shaniwar Wada, Pune");
    }

    #[test]
    fn json_helpers_round_trip_through_the_store() {
        let store = MemoryStore::new();
        let point = GeoPoint {
            lat: 18.5195,
            lng: 73.8553,
            name: "Shaniwar Wada".into(),
        };

        set_json(&store, &keys::geo("Shaniwar Wada"), &point);

        assert_eq!(store.len(), 1);
        assert_eq!(
            get_json::<GeoPoint>(&store, "geo:Shaniwar Wada"),
            Some(point)
        );
    }

    #[test]
    fn corrupt_entries_are_misses() {
        let store = MemoryStore::new();
        store.set("geo:Lonavala", "not json".to_string());
        assert_eq!(get_json::<GeoPoint>(&store, "geo:Lonavala"), None);
    }
}
