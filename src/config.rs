//! Configuration Module
//!
//! Handles loading engine configuration from environment variables.

use std::env;

/// Engine configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries a single cache store can hold (0 = unbounded)
    pub max_entries: usize,
    /// Tracing filter directive used by [`crate::telemetry::init`]
    pub log_filter: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_MAX_ENTRIES` - Per-store capacity, 0 for unbounded (default: 0)
    /// - `MEMO_LOG` - Tracing filter directive (default: `memo_decorator=info`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env::var("MEMO_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
            log_filter: env::var("MEMO_LOG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        }
    }

    /// Returns the capacity bound, or None when stores are unbounded.
    pub fn capacity(&self) -> Option<usize> {
        (self.max_entries > 0).then_some(self.max_entries)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 0,
            log_filter: "memo_decorator=info".to_string(),
        }
    }
}
