//! The Host Record Store: `HostIP -> current bucket` locator.
//!
//! §4.1 describes the store as "a mapping HostIP -> HostRecord" that is
//! the single source of truth for a host's attributes, with "every field
//! mutation... performed under the lock of the bucket currently holding
//! that record". In this implementation the bucket *is* that lock-guarded
//! storage (see [`super::index::Bucket`]); the store therefore only needs
//! to remember which bucket a given host currently lives in, so `lookup`
//! can go straight to the right mutex instead of scanning all twelve
//! buckets. `DashMap` gives this locator lock-free concurrent reads,
//! matching the store's "effectively append-only" policy (§5).

use dashmap::DashMap;

use super::model::{BucketKey, HostRecord};

/// Keyed map from host identity to the bucket it currently occupies.
#[derive(Default)]
pub struct HostRecordStore {
    locations: DashMap<String, BucketKey>,
}

impl HostRecordStore {
    pub fn new() -> Self {
        Self {
            locations: DashMap::new(),
        }
    }

    /// Record that `host_ip` now lives in `key`. Called once at creation
    /// and again at the end of every cross-bucket move (phase 2, under the
    /// destination lock) and every class/region transition.
    pub fn set_location(&self, host_ip: &str, key: BucketKey) {
        self.locations.insert(host_ip.to_string(), key);
    }

    /// The bucket `host_ip` is currently filed under, if it has been created.
    pub fn location(&self, host_ip: &str) -> Option<BucketKey> {
        self.locations.get(host_ip).map(|entry| *entry.value())
    }

    /// Whether a host with this identity has ever been created.
    pub fn contains(&self, host_ip: &str) -> bool {
        self.locations.contains_key(host_ip)
    }

    /// Look up a host's current record by following its locator to the
    /// owning bucket and snapshotting the record from there. Returns
    /// `None` both for hosts that were never created and, transiently,
    /// for hosts caught between the two phases of a move (§4.3, §5) —
    /// callers that need to distinguish the two should check
    /// [`HostRecordStore::contains`] first.
    pub fn lookup(&self, index: &super::index::ClassifiedIndex, host_ip: &str) -> Option<HostRecord> {
        let key = self.location(host_ip)?;
        index.bucket(key).get(host_ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::model::{HostClass, Region};

    #[test]
    fn unknown_host_has_no_location() {
        let store = HostRecordStore::new();
        assert_eq!(store.location("10.0.0.1"), None);
        assert!(!store.contains("10.0.0.1"));
    }

    #[test]
    fn recorded_location_is_retrievable() {
        let store = HostRecordStore::new();
        let key = BucketKey::new(Region::Lee, HostClass::LEAST_RESTRICTIVE);
        store.set_location("10.0.0.1", key);
        assert_eq!(store.location("10.0.0.1"), Some(key));
        assert!(store.contains("10.0.0.1"));
    }
}
