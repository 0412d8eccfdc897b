//! Explicit read-through cache of record snapshots.
//!
//! The pipeline itself is pure and stateless; the only shared state a
//! caller may want is a cache of the materialized record collections it
//! fetched for a window. This cache is that object, made explicit: there
//! is no TTL and no implicit staleness, the caller owns invalidation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use rt_common::RecordSet;

/// Cache key: the fetch window plus the optional entity filter it was
/// fetched with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub entity: Option<String>,
}

/// Read-through snapshot cache, safe to share across concurrent
/// investigations.
#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: RwLock<HashMap<SnapshotKey, Arc<RecordSet>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SnapshotKey) -> Option<Arc<RecordSet>> {
        self.entries.read().expect("snapshot cache poisoned").get(key).cloned()
    }

    pub fn insert(&self, key: SnapshotKey, records: RecordSet) -> Arc<RecordSet> {
        let records = Arc::new(records);
        self.entries
            .write()
            .expect("snapshot cache poisoned")
            .insert(key, Arc::clone(&records));
        records
    }

    /// Fetch through the cache: returns the cached snapshot or materializes
    /// one with `fetch` and stores it.
    pub fn get_or_insert_with<F>(&self, key: SnapshotKey, fetch: F) -> Arc<RecordSet>
    where
        F: FnOnce() -> RecordSet,
    {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        self.insert(key, fetch())
    }

    /// Drop one cached snapshot. Returns true when an entry was present.
    pub fn invalidate(&self, key: &SnapshotKey) -> bool {
        self.entries
            .write()
            .expect("snapshot cache poisoned")
            .remove(key)
            .is_some()
    }

    pub fn invalidate_all(&self) {
        self.entries.write().expect("snapshot cache poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("snapshot cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(entity: Option<&str>) -> SnapshotKey {
        SnapshotKey {
            window_start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            window_end: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            entity: entity.map(String::from),
        }
    }

    #[test]
    fn read_through_fetches_once() {
        let cache = SnapshotCache::new();
        let mut fetches = 0;

        let first = cache.get_or_insert_with(key(Some("acme")), || {
            fetches += 1;
            RecordSet::default()
        });
        assert_eq!(fetches, 1);

        let second = cache.get_or_insert_with(key(Some("acme")), || unreachable!());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn entity_filter_is_part_of_the_key() {
        let cache = SnapshotCache::new();
        cache.insert(key(Some("acme")), RecordSet::default());
        assert!(cache.get(&key(None)).is_none());
        assert!(cache.get(&key(Some("acme"))).is_some());
    }

    #[test]
    fn invalidation_is_explicit() {
        let cache = SnapshotCache::new();
        cache.insert(key(None), RecordSet::default());
        assert!(cache.invalidate(&key(None)));
        assert!(!cache.invalidate(&key(None)));
        assert!(cache.is_empty());

        cache.insert(key(None), RecordSet::default());
        cache.insert(key(Some("acme")), RecordSet::default());
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
