//! Decorated Wrapper Module
//!
//! Generic decorator that owns one wrapped instance and one cache store, and
//! routes each planned method call through the cache or straight through.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStore, CachedValue, ExpiringStore};
use crate::config::Config;
use crate::decorator::{CallMode, DecoratorPlan};
use crate::key::{derive_key, CacheKey, KeyArg, MethodIdentity};
use crate::policy::{CachePolicy, HashAlgorithm};

// == Decorated ==
/// A wrapped instance plus the store that memoizes its planned methods.
///
/// The store belongs to this decorator alone; two decorators never observe
/// each other's entries. Implement the owner's trait for `Decorated<T>` and
/// route each method through [`Decorated::invoke`] to get the same callable
/// surface as `T`.
///
/// Concurrent callers that miss on the same key both run the wrapped method
/// and the later write replaces the earlier one.
pub struct Decorated<T, S = CacheStore> {
    inner: T,
    store: S,
    plan: Arc<DecoratorPlan>,
}

impl<T> Decorated<T, CacheStore> {
    /// Wraps `inner` with a fresh unbounded store.
    pub fn new(inner: T, plan: Arc<DecoratorPlan>) -> Self {
        Self::with_store(inner, plan, CacheStore::new())
    }

    /// Wraps `inner` with a store sized from configuration.
    pub fn from_config(inner: T, plan: Arc<DecoratorPlan>, config: &Config) -> Self {
        Self::with_store(inner, plan, CacheStore::from_config(config))
    }

    pub fn store_stats(&self) -> CacheStats {
        self.store.stats()
    }
}

impl<T, S: ExpiringStore> Decorated<T, S> {
    pub fn with_store(inner: T, plan: Arc<DecoratorPlan>, store: S) -> Self {
        Self { inner, store, plan }
    }

    /// The wrapped instance, for methods the plan does not represent.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn plan(&self) -> &DecoratorPlan {
        &self.plan
    }

    // == Key Derivation ==
    /// Derives a key with the algorithm named at runtime; unknown names use
    /// SHA256.
    pub fn derive_key(
        &self,
        method: &MethodIdentity,
        args: &[&dyn KeyArg],
        algorithm_name: &str,
    ) -> CacheKey {
        derive_key(method, args, HashAlgorithm::from_name(algorithm_name))
    }

    pub fn derive_key_default(&self, method: &MethodIdentity, args: &[&dyn KeyArg]) -> CacheKey {
        derive_key(method, args, HashAlgorithm::Sha256)
    }

    // == Invoke ==
    /// Calls `call` on the wrapped instance, through the cache if the plan
    /// caches `method`.
    ///
    /// A panic in `call` unwinds through unchanged and nothing is stored.
    pub fn invoke<R, F>(&self, method: &MethodIdentity, args: &[&dyn KeyArg], call: F) -> R
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> R,
    {
        let Some(policy) = self.cached_policy(method) else {
            return call(&self.inner);
        };

        let key = derive_key(method, args, policy.hash_algorithm());
        if let Some(hit) = self.lookup::<R>(method, &key) {
            return hit;
        }

        let value = call(&self.inner);
        self.remember(key, &value, &policy);
        value
    }

    /// Like [`Decorated::invoke`] for fallible methods. Only `Ok` results are
    /// stored; an `Err` is returned as is and the next call runs again.
    pub fn try_invoke<R, E, F>(
        &self,
        method: &MethodIdentity,
        args: &[&dyn KeyArg],
        call: F,
    ) -> Result<R, E>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> Result<R, E>,
    {
        let Some(policy) = self.cached_policy(method) else {
            return call(&self.inner);
        };

        let key = derive_key(method, args, policy.hash_algorithm());
        if let Some(hit) = self.lookup::<R>(method, &key) {
            return Ok(hit);
        }

        let value = call(&self.inner)?;
        self.remember(key, &value, &policy);
        Ok(value)
    }

    fn cached_policy(&self, method: &MethodIdentity) -> Option<CachePolicy> {
        match self.plan.method(method).map(|m| m.mode) {
            Some(CallMode::Cached(policy)) => Some(policy),
            Some(CallMode::PassThrough) => {
                debug!(method = %method, "pass-through call");
                None
            }
            None => {
                warn!(method = %method, "method not in plan, forwarding");
                None
            }
        }
    }

    fn lookup<R: Clone + 'static>(&self, method: &MethodIdentity, key: &CacheKey) -> Option<R> {
        let Some(value) = self.store.try_get(key) else {
            debug!(method = %method, "cache miss");
            return None;
        };
        match value.downcast_ref::<R>() {
            Some(hit) => {
                debug!(method = %method, "cache hit");
                Some(hit.clone())
            }
            None => {
                warn!(method = %method, key = %key, "cached value has unexpected type, recomputing");
                None
            }
        }
    }

    fn remember<R: Send + Sync + Clone + 'static>(
        &self,
        key: CacheKey,
        value: &R,
        policy: &CachePolicy,
    ) {
        let envelope: CachedValue = Arc::new(value.clone());
        self.store
            .set(key, envelope, policy.absolute_ttl(), policy.sliding_ttl());
    }
}
