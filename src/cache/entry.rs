//! Cache Entry Module
//!
//! Defines a stored result together with its absolute and sliding expiration.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Type-erased result envelope. Only the owning method wrapper downcasts it.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

// == Cache Entry ==
/// Represents a single cache entry with value and expiration metadata.
#[derive(Clone)]
pub struct CacheEntry {
    /// The stored value
    pub value: CachedValue,
    /// When the entry was written
    pub created_at: Instant,
    /// Last successful lookup (or creation), drives sliding expiration
    pub last_accessed_at: Instant,
    /// Lifetime measured from `created_at`, None = no absolute expiration
    pub absolute_ttl: Option<Duration>,
    /// Idle lifetime measured from `last_accessed_at`, None = no sliding expiration
    pub sliding_ttl: Option<Duration>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current instant.
    pub fn new(
        value: CachedValue,
        absolute_ttl: Option<Duration>,
        sliding_ttl: Option<Duration>,
    ) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            last_accessed_at: now,
            absolute_ttl,
            sliding_ttl,
        }
    }

    // == Is Expired ==
    /// Checks whether either expiration has fired at `now`.
    ///
    /// Boundary condition: an entry is expired once the elapsed time is
    /// greater than or equal to its TTL, so a zero TTL is expired on the
    /// very next check.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        let absolute_fired = self
            .absolute_ttl
            .is_some_and(|ttl| now.saturating_duration_since(self.created_at) >= ttl);
        let sliding_fired = self
            .sliding_ttl
            .is_some_and(|ttl| now.saturating_duration_since(self.last_accessed_at) >= ttl);
        absolute_fired || sliding_fired
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Touch ==
    /// Records a hit, restarting the sliding window.
    pub fn touch(&mut self, now: Instant) {
        self.last_accessed_at = now;
    }

    // == Time To Live ==
    /// Returns the time left before the earlier of the two expirations.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the entry has expired
    /// - `Some(remaining)` if at least one TTL is set and hasn't elapsed
    /// - `None` if the entry never expires
    pub fn ttl_remaining_at(&self, now: Instant) -> Option<Duration> {
        let absolute = self
            .absolute_ttl
            .map(|ttl| ttl.saturating_sub(now.saturating_duration_since(self.created_at)));
        let sliding = self
            .sliding_ttl
            .map(|ttl| ttl.saturating_sub(now.saturating_duration_since(self.last_accessed_at)));
        match (absolute, sliding) {
            (Some(a), Some(s)) => Some(a.min(s)),
            (a, s) => a.or(s),
        }
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("created_at", &self.created_at)
            .field("last_accessed_at", &self.last_accessed_at)
            .field("absolute_ttl", &self.absolute_ttl)
            .field("sliding_ttl", &self.sliding_ttl)
            .finish_non_exhaustive()
    }
}
