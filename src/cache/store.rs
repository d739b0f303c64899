//! Cache Store Module
//!
//! Thread-safe expiring store: HashMap storage with lazy TTL expiration and an
//! optional LRU capacity bound.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use crate::cache::{CacheEntry, CacheStats, CachedValue, ExpiringStore, LruTracker};
use crate::config::Config;
use crate::key::CacheKey;

// == Cache Store ==
/// In-process expiring store shared by every cached method of one owner.
///
/// Expired entries are dropped when they are next looked up (or by an
/// explicit [`CacheStore::purge_expired`]); there is no background sweep.
#[derive(Debug, Default)]
pub struct CacheStore {
    inner: Mutex<StoreInner>,
    /// Maximum number of entries, None = unbounded
    max_entries: Option<usize>,
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Only maintained when the store is bounded
    lru: Option<LruTracker>,
    stats: CacheStats,
}

impl CacheStore {
    // == Constructors ==
    /// Creates an unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that evicts its least recently used entry once it
    /// holds `max_entries` entries.
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                lru: Some(LruTracker::new()),
                ..StoreInner::default()
            }),
            max_entries: Some(max_entries.max(1)),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        match config.capacity() {
            Some(max_entries) => Self::with_capacity(max_entries),
            None => Self::new(),
        }
    }

    // == Try Get ==
    /// Returns the live value stored under `key`.
    ///
    /// A hit restarts the entry's sliding window. An expired entry is
    /// removed and reported as a miss.
    pub fn try_get(&self, key: &CacheKey) -> Option<CachedValue> {
        let now = Instant::now();
        let mut guard = self.inner.lock();
        let inner = &mut *guard;

        let expired = match inner.entries.get_mut(key) {
            None => {
                inner.stats.record_miss();
                return None;
            }
            Some(entry) if entry.is_expired_at(now) => true,
            Some(entry) => {
                entry.touch(now);
                false
            }
        };

        if expired {
            inner.remove_entry(key);
            inner.stats.record_expiration();
            inner.stats.record_miss();
            trace!(key = %key, "expired entry dropped on lookup");
            return None;
        }

        let value = inner.entries.get(key).map(|entry| entry.value.clone());
        if let Some(lru) = inner.lru.as_mut() {
            lru.touch(key);
        }
        inner.stats.record_hit();
        value
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// Concurrent writers to the same key race; the last write wins.
    pub fn set(
        &self,
        key: CacheKey,
        value: CachedValue,
        absolute_ttl: Option<Duration>,
        sliding_ttl: Option<Duration>,
    ) {
        let mut inner = self.inner.lock();
        inner.insert(key, CacheEntry::new(value, absolute_ttl, sliding_ttl), self.max_entries);
    }

    // == Set If Absent ==
    /// Stores `value` only if no live entry exists for `key`.
    ///
    /// Returns true if the value was written.
    pub fn set_if_absent(
        &self,
        key: CacheKey,
        value: CachedValue,
        absolute_ttl: Option<Duration>,
        sliding_ttl: Option<Duration>,
    ) -> bool {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let live = inner
            .entries
            .get(&key)
            .is_some_and(|entry| !entry.is_expired_at(now));
        if live {
            return false;
        }
        inner.insert(key, CacheEntry::new(value, absolute_ttl, sliding_ttl), self.max_entries);
        true
    }

    // == Remove ==
    /// Removes an entry by key. Returns true if one was present.
    pub fn remove(&self, key: &CacheKey) -> bool {
        self.inner.lock().remove_entry(key)
    }

    // == Purge Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let expired_keys: Vec<CacheKey> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            inner.remove_entry(key);
            inner.stats.record_expiration();
        }
        expired_keys.len()
    }

    /// Drops every entry. Statistics are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        if let Some(lru) = inner.lru.as_mut() {
            lru.clear();
        }
        inner.stats.set_total_entries(0);
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    /// Number of entries currently held, including ones not yet found expired.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.max_entries
    }
}

impl StoreInner {
    fn insert(&mut self, key: CacheKey, entry: CacheEntry, max_entries: Option<usize>) {
        let is_overwrite = self.entries.contains_key(&key);

        if let (Some(max), Some(lru)) = (max_entries, self.lru.as_mut()) {
            if !is_overwrite && self.entries.len() >= max {
                if let Some(evicted) = lru.evict_oldest() {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                    trace!(key = %evicted, "evicted least recently used entry");
                }
            }
            lru.touch(&key);
        }

        self.entries.insert(key, entry);
        self.stats.set_total_entries(self.entries.len());
    }

    fn remove_entry(&mut self, key: &CacheKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if let Some(lru) = self.lru.as_mut() {
            lru.remove(key);
        }
        self.stats.set_total_entries(self.entries.len());
        removed
    }
}

impl ExpiringStore for CacheStore {
    fn try_get(&self, key: &CacheKey) -> Option<CachedValue> {
        CacheStore::try_get(self, key)
    }

    fn set(
        &self,
        key: CacheKey,
        value: CachedValue,
        absolute_ttl: Option<Duration>,
        sliding_ttl: Option<Duration>,
    ) {
        CacheStore::set(self, key, value, absolute_ttl, sliding_ttl);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{derive_key, MethodIdentity};
    use crate::key_args;
    use crate::policy::HashAlgorithm;
    use std::sync::Arc;
    use std::thread::sleep;

    fn key(n: i32) -> CacheKey {
        let id = MethodIdentity::new("Store", "sample", &["i32"]).unwrap();
        derive_key(&id, key_args![n], HashAlgorithm::Sha256)
    }

    fn read(store: &CacheStore, n: i32) -> Option<String> {
        store
            .try_get(&key(n))
            .and_then(|v| v.downcast_ref::<String>().cloned())
    }

    fn put(store: &CacheStore, n: i32, value: &str) {
        store.set(key(n), Arc::new(value.to_string()), None, None);
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), None);
    }

    #[test]
    fn test_store_set_and_get() {
        let store = CacheStore::new();
        put(&store, 1, "one");

        assert_eq!(read(&store, 1).as_deref(), Some("one"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_missing() {
        let store = CacheStore::new();
        assert!(store.try_get(&key(404)).is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite_last_write_wins() {
        let store = CacheStore::new();
        put(&store, 1, "first");
        put(&store, 1, "second");

        assert_eq!(read(&store, 1).as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_if_absent_keeps_first() {
        let store = CacheStore::new();
        assert!(store.set_if_absent(key(1), Arc::new("first".to_string()), None, None));
        assert!(!store.set_if_absent(key(1), Arc::new("second".to_string()), None, None));
        assert_eq!(read(&store, 1).as_deref(), Some("first"));
    }

    #[test]
    fn test_set_if_absent_replaces_expired() {
        let store = CacheStore::new();
        store.set(key(1), Arc::new("stale".to_string()), Some(Duration::ZERO), None);
        assert!(store.set_if_absent(key(1), Arc::new("fresh".to_string()), None, None));
        assert_eq!(read(&store, 1).as_deref(), Some("fresh"));
    }

    #[test]
    fn test_zero_ttl_misses_on_next_lookup() {
        let store = CacheStore::new();
        store.set(key(1), Arc::new("gone".to_string()), Some(Duration::ZERO), None);

        assert!(read(&store, 1).is_none());
        let stats = store.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.misses, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_sliding_expiration() {
        let store = CacheStore::new();
        store.set(
            key(1),
            Arc::new("slide".to_string()),
            None,
            Some(Duration::from_millis(150)),
        );

        // Keep touching within the window
        for _ in 0..4 {
            sleep(Duration::from_millis(50));
            assert!(read(&store, 1).is_some());
        }

        // Go idle past the window
        sleep(Duration::from_millis(200));
        assert!(read(&store, 1).is_none());
    }

    #[test]
    fn test_lru_eviction_when_bounded() {
        let store = CacheStore::with_capacity(3);
        put(&store, 1, "a");
        put(&store, 2, "b");
        put(&store, 3, "c");

        // Touch 1 so 2 becomes the oldest
        assert!(read(&store, 1).is_some());
        put(&store, 4, "d");

        assert_eq!(store.len(), 3);
        assert!(read(&store, 2).is_none());
        assert!(read(&store, 1).is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_unbounded_never_evicts() {
        let store = CacheStore::new();
        for n in 0..500 {
            put(&store, n, "v");
        }
        assert_eq!(store.len(), 500);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_purge_expired() {
        let store = CacheStore::new();
        store.set(key(1), Arc::new(1u8), Some(Duration::from_millis(20)), None);
        store.set(key(2), Arc::new(2u8), Some(Duration::from_secs(60)), None);

        sleep(Duration::from_millis(40));

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.try_get(&key(2)).is_some());
    }

    #[test]
    fn test_remove_and_clear() {
        let store = CacheStore::new();
        put(&store, 1, "a");
        put(&store, 2, "b");

        assert!(store.remove(&key(1)));
        assert!(!store.remove(&key(1)));

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.stats().total_entries, 0);
    }

    #[test]
    fn test_from_config() {
        let bounded = CacheStore::from_config(&Config {
            max_entries: 10,
            ..Config::default()
        });
        assert_eq!(bounded.capacity(), Some(10));
        assert_eq!(CacheStore::from_config(&Config::default()).capacity(), None);
    }
}
