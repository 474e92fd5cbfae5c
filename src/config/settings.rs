//! # Configuration Settings
//!
//! Settings consumed by the outbound listener build and by logging.

use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::errors::Result;
use crate::xds::route_table::ClusterRouteDefinition;

/// Prefix of every environment variable read by grpc-egress
pub const ENV_PREFIX: &str = "GRPC_EGRESS";

/// Outbound port used when nothing is configured
pub const DEFAULT_OUTBOUND_PORT: &str = "5443";

/// Settings for the outbound listener build.
///
/// `outbound_port` stays a string here: it is parsed by the listener builder
/// so that a malformed value surfaces as an invalid-port build error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OutboundSettings {
    pub outbound_port: String,

    /// Additional internal gRPC services routed ahead of the catch-all
    #[serde(default)]
    #[validate(nested)]
    pub internal_services: Vec<ClusterRouteDefinition>,
}

impl Default for OutboundSettings {
    fn default() -> Self {
        Self { outbound_port: DEFAULT_OUTBOUND_PORT.to_string(), internal_services: Vec::new() }
    }
}

impl OutboundSettings {
    /// Read the outbound port from `GRPC_EGRESS_OUTBOUND_PORT`
    pub fn from_env() -> Self {
        let outbound_port = std::env::var(format!("{}_OUTBOUND_PORT", ENV_PREFIX))
            .unwrap_or_else(|_| DEFAULT_OUTBOUND_PORT.to_string());

        Self { outbound_port, ..Default::default() }
    }

    /// Layer an optional settings file (YAML, TOML or JSON, by extension)
    /// under `GRPC_EGRESS_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .set_default("outbound_port", DEFAULT_OUTBOUND_PORT)?;

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }

        let settings: Self = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(false))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Enable JSON structured logging
    pub json_logging: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logging: false }
    }
}

impl ObservabilityConfig {
    pub fn from_env() -> Self {
        let log_level = std::env::var(format!("{}_LOG_LEVEL", ENV_PREFIX))
            .unwrap_or_else(|_| "info".to_string());

        let json_logging = std::env::var(format!("{}_JSON_LOGGING", ENV_PREFIX))
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        Self { log_level, json_logging }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = OutboundSettings::default();
        assert_eq!(settings.outbound_port, "5443");
        assert!(settings.internal_services.is_empty());
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
outbound_port: "9443"
internal_services:
  - cluster_name: pomerium-metrics
    path_prefixes: ["/metrics.Metrics/"]
    timeouts:
      request_timeout: 30
"#
        )
        .unwrap();

        let settings = OutboundSettings::load(Some(file.path())).unwrap();
        assert_eq!(settings.outbound_port, "9443");
        assert_eq!(settings.internal_services.len(), 1);
        assert_eq!(settings.internal_services[0].cluster_name, "pomerium-metrics");
        assert_eq!(
            settings.internal_services[0].timeouts.request_timeout.as_duration(),
            std::time::Duration::from_secs(30)
        );
    }

    #[test]
    fn test_load_rejects_invalid_service() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
outbound_port: "9443"
internal_services:
  - cluster_name: ""
    path_prefixes: ["/metrics.Metrics/"]
"#
        )
        .unwrap();

        let err = OutboundSettings::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "unexpected error: {:?}", err);
    }

    #[test]
    fn test_load_missing_file() {
        let err = OutboundSettings::load(Some(Path::new("/nonexistent/grpc-egress.yaml")))
            .unwrap_err();
        assert!(matches!(err, Error::Settings(_)));
    }

    #[test]
    fn test_observability_defaults() {
        let config = ObservabilityConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logging);
    }
}
