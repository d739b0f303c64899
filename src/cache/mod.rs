//! Cache Module
//!
//! Expiring in-memory storage for memoized results.

mod entry;
mod lru;
mod stats;
mod store;


use std::time::Duration;

use crate::key::CacheKey;

// Re-export public types
pub use entry::{CacheEntry, CachedValue};
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Expiring Store ==
/// Storage contract the decorators depend on.
///
/// Implementations must be safe for concurrent use and must never expose a
/// partially written value.
pub trait ExpiringStore: Send + Sync {
    /// Returns the live value for `key`, refreshing its sliding window.
    fn try_get(&self, key: &CacheKey) -> Option<CachedValue>;

    /// Stores `value` under `key`, replacing any existing entry.
    fn set(
        &self,
        key: CacheKey,
        value: CachedValue,
        absolute_ttl: Option<Duration>,
        sliding_ttl: Option<Duration>,
    );
}
