//! Cache Policy Descriptor Module
//!
//! Turns per-method annotation data into an immutable expiration policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MemoError, Result};
use crate::policy::HashAlgorithm;

// == Cache Annotation ==
/// Raw per-method annotation, as declared on the host type.
///
/// Every field is optional. Negative TTL values mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheAnnotation {
    /// Absolute expiration relative to the moment the entry is written
    #[serde(rename = "absoluteExpirationRelativeToNowSeconds")]
    pub absolute_expiration_seconds: Option<f64>,
    /// Sliding expiration, reset on every hit
    pub sliding_expiration_seconds: Option<f64>,
    /// Hash algorithm name (SHA256, SHA1, SHA384, SHA512, MD5)
    pub hashing_method: Option<String>,
}

impl CacheAnnotation {
    /// Creates an annotation with every option left at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an annotation from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| MemoError::InvalidAnnotation(e.to_string()))
    }

    pub fn absolute_seconds(mut self, seconds: f64) -> Self {
        self.absolute_expiration_seconds = Some(seconds);
        self
    }

    pub fn sliding_seconds(mut self, seconds: f64) -> Self {
        self.sliding_expiration_seconds = Some(seconds);
        self
    }

    pub fn hashing_method(mut self, name: impl Into<String>) -> Self {
        self.hashing_method = Some(name.into());
        self
    }
}

// == Cache Policy ==
/// Expiration and hashing policy attached to one cached method.
///
/// A TTL of zero is a real value (the entry is stale on the next lookup),
/// distinct from an unset TTL. When both TTLs are set, whichever elapses
/// first evicts the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CachePolicy {
    absolute_ttl: Option<Duration>,
    sliding_ttl: Option<Duration>,
    hash_algorithm: HashAlgorithm,
}

impl CachePolicy {
    // == Constructor ==
    pub fn new(
        absolute_ttl: Option<Duration>,
        sliding_ttl: Option<Duration>,
        hash_algorithm: HashAlgorithm,
    ) -> Self {
        Self {
            absolute_ttl,
            sliding_ttl,
            hash_algorithm,
        }
    }

    // == From Annotation ==
    /// Extracts a policy from annotation data.
    ///
    /// Negative or non-finite TTLs become unset and unknown hash names become
    /// SHA256. Nothing here can fail.
    pub fn from_annotation(annotation: &CacheAnnotation) -> Self {
        Self {
            absolute_ttl: annotation.absolute_expiration_seconds.and_then(ttl_from_seconds),
            sliding_ttl: annotation.sliding_expiration_seconds.and_then(ttl_from_seconds),
            hash_algorithm: annotation
                .hashing_method
                .as_deref()
                .map(HashAlgorithm::from_name)
                .unwrap_or_default(),
        }
    }

    pub fn absolute_ttl(&self) -> Option<Duration> {
        self.absolute_ttl
    }

    pub fn sliding_ttl(&self) -> Option<Duration> {
        self.sliding_ttl
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    /// Returns true if neither TTL is set.
    pub fn is_unbounded(&self) -> bool {
        self.absolute_ttl.is_none() && self.sliding_ttl.is_none()
    }
}

/// Converts a declared seconds value into a TTL, treating negatives as unset.
fn ttl_from_seconds(seconds: f64) -> Option<Duration> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    let nanos = (seconds * 1e9).round();
    if nanos >= u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(nanos as u64))
}
