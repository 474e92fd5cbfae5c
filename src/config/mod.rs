//! # Configuration Management
//!
//! Outbound listener and logging settings, read from the environment or from
//! a settings file layered under environment variables.

pub mod settings;

pub use settings::{ObservabilityConfig, OutboundSettings, DEFAULT_OUTBOUND_PORT, ENV_PREFIX};
