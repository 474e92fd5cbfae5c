//! # Observability Infrastructure
//!
//! Structured logging for grpc-egress. Logs go to stderr so rendered
//! configuration on stdout stays machine readable.

pub mod logging;

pub use logging::log_settings_info;

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};
use tracing_subscriber::EnvFilter;
use validator::Validate;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured log level.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            Error::validation(format!("Invalid log level '{}': {}", config.log_level, e))
        })?;

    let builder =
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    let result = if config.json_logging { builder.json().try_init() } else { builder.try_init() };

    result.map_err(|e| Error::internal(format!("Failed to initialize logging: {}", e)))
}
