//! Runtime Proxy Module
//!
//! Interface-level interception for targets known only through a trait
//! object. The annotation is looked up on every call, and all proxies in the
//! process share one store.
//!
//! Differences from [`crate::decorator::Decorated`]:
//! - keys use the owner-qualified method name only, so overloads share entries
//! - the store is process-wide, not per proxy
//! - entries never expire, and the first write for a key is kept

use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use tracing::{debug, warn};

use crate::cache::{CacheStore, CachedValue};
use crate::error::{MemoError, Result};
use crate::key::{derive_qualified_key, CacheKey, KeyArg, MethodIdentity};
use crate::registry::MethodTable;

static PROXY_STORE: Lazy<CacheStore> = Lazy::new(CacheStore::new);

// == Cache Proxy ==
/// Proxy over one target of interface type `I`.
///
/// The target is assigned once and cannot be replaced. Calls made before it
/// is assigned fail with [`MemoError::NotConfigured`].
pub struct CacheProxy<I: ?Sized> {
    target: OnceCell<Box<I>>,
    /// None = process-wide table
    table: Option<Arc<MethodTable>>,
}

impl<I: ?Sized> Default for CacheProxy<I> {
    fn default() -> Self {
        Self {
            target: OnceCell::new(),
            table: None,
        }
    }
}

impl<I: ?Sized> CacheProxy<I> {
    /// Unconfigured proxy resolving annotations from [`MethodTable::global`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconfigured proxy resolving annotations from `table`.
    pub fn with_table(table: Arc<MethodTable>) -> Self {
        Self {
            target: OnceCell::new(),
            table: Some(table),
        }
    }

    /// Builds a proxy that is already bound to `target`.
    pub fn with_target(target: Box<I>) -> Self {
        let proxy = Self::new();
        // A fresh cell always accepts its first value
        let _ = proxy.target.set(target);
        proxy
    }

    // == Configuration ==
    pub fn set_target(&self, target: Box<I>) -> Result<()> {
        self.target
            .set(target)
            .map_err(|_| MemoError::AlreadyConfigured)
    }

    pub fn is_configured(&self) -> bool {
        self.target.get().is_some()
    }

    pub fn target(&self) -> Result<&I> {
        self.target
            .get()
            .map(|target| &**target)
            .ok_or(MemoError::NotConfigured)
    }

    /// Store shared by every proxy in the process.
    pub fn shared_store() -> &'static CacheStore {
        &PROXY_STORE
    }

    fn table(&self) -> &MethodTable {
        match &self.table {
            Some(table) => table,
            None => MethodTable::global(),
        }
    }

    fn is_cached(&self, method: &MethodIdentity) -> bool {
        self.table().lookup(method).is_some()
    }

    // == Invoke ==
    /// Calls `call` on the target, through the shared store if `method` is
    /// annotated.
    pub fn invoke<R, F>(&self, method: &MethodIdentity, args: &[&dyn KeyArg], call: F) -> Result<R>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce(&I) -> R,
    {
        let target = self.target()?;
        if !self.is_cached(method) {
            debug!(method = %method, "no annotation, forwarding");
            return Ok(call(target));
        }

        let key = derive_qualified_key(method, args);
        if let Some(hit) = lookup::<R>(method, &key) {
            return Ok(hit);
        }

        let value = call(target);
        let envelope: CachedValue = Arc::new(value.clone());
        if !PROXY_STORE.set_if_absent(key, envelope, None, None) {
            debug!(method = %method, "entry already present, keeping first write");
        }
        Ok(value)
    }

    /// Fallible form of [`CacheProxy::invoke`]. Only `Ok` results are stored.
    pub fn try_invoke<R, E, F>(
        &self,
        method: &MethodIdentity,
        args: &[&dyn KeyArg],
        call: F,
    ) -> std::result::Result<R, E>
    where
        R: Clone + Send + Sync + 'static,
        E: From<MemoError>,
        F: FnOnce(&I) -> std::result::Result<R, E>,
    {
        let target = self.target()?;
        if !self.is_cached(method) {
            debug!(method = %method, "no annotation, forwarding");
            return call(target);
        }

        let key = derive_qualified_key(method, args);
        if let Some(hit) = lookup::<R>(method, &key) {
            return Ok(hit);
        }

        let value = call(target)?;
        let envelope: CachedValue = Arc::new(value.clone());
        PROXY_STORE.set_if_absent(key, envelope, None, None);
        Ok(value)
    }
}

fn lookup<R: Clone + 'static>(method: &MethodIdentity, key: &CacheKey) -> Option<R> {
    let value = PROXY_STORE.try_get(key);
    debug!(method = %method, hit = value.is_some(), "proxy lookup");
    let hit = value?.downcast_ref::<R>().cloned();
    if hit.is_none() {
        warn!(method = %method, key = %key, "cached value has unexpected type, recomputing");
    }
    hit
}
