//! Telemetry Module
//!
//! Installs the tracing subscriber used for engine logging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Initializes a tracing subscriber with an env filter and fmt layer.
///
/// `RUST_LOG` takes precedence over [`Config::log_filter`] when set.
/// Returns an error if a global subscriber is already installed.
pub fn init(config: &Config) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str())),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
