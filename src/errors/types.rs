//! # Configuration Build Errors
//!
//! Structured errors raised while turning the outbound route table into an
//! Envoy listener. Each failure carries a machine readable kind and, for
//! failures that happened in a sub-builder, the stage that failed.

use std::fmt;

/// Stage of the outbound listener build that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStage {
    RouteConfiguration,
    ConnectionManager,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildStage::RouteConfiguration => write!(f, "outbound route configuration"),
            BuildStage::ConnectionManager => {
                write!(f, "outbound http connection manager filter")
            }
        }
    }
}

/// Machine readable category of a [`ConfigError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigErrorKind {
    InvalidPort,
    NestedBuildFailure,
    InvalidRouteTable,
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigErrorKind::InvalidPort => write!(f, "invalid_port"),
            ConfigErrorKind::NestedBuildFailure => write!(f, "nested_build_failure"),
            ConfigErrorKind::InvalidRouteTable => write!(f, "invalid_route_table"),
        }
    }
}

/// Error returned by the outbound configuration builders.
///
/// Any `ConfigError` is fatal to the configuration reload that produced it:
/// the builders never return a partially constructed descriptor.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configured outbound port is not an integer in `1..=65535`
    #[error("invalid outbound port {value:?}: {reason}")]
    InvalidPort { value: String, reason: String },

    /// A sub-builder failed; `stage` names the builder that was running
    #[error("error building {stage}")]
    NestedBuild {
        stage: BuildStage,
        #[source]
        source: Box<ConfigError>,
    },

    /// The route table violates an ordering or content rule
    #[error("invalid route table: {message}")]
    InvalidRouteTable { message: String },
}

impl ConfigError {
    /// Create an invalid port error
    pub fn invalid_port<V: Into<String>, R: fmt::Display>(value: V, reason: R) -> Self {
        Self::InvalidPort { value: value.into(), reason: reason.to_string() }
    }

    /// Wrap a sub-builder failure with the stage that was running
    pub fn nested(stage: BuildStage, source: ConfigError) -> Self {
        Self::NestedBuild { stage, source: Box::new(source) }
    }

    /// Create a route table error
    pub fn invalid_route_table<S: Into<String>>(message: S) -> Self {
        Self::InvalidRouteTable { message: message.into() }
    }

    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            ConfigError::InvalidPort { .. } => ConfigErrorKind::InvalidPort,
            ConfigError::NestedBuild { .. } => ConfigErrorKind::NestedBuildFailure,
            ConfigError::InvalidRouteTable { .. } => ConfigErrorKind::InvalidRouteTable,
        }
    }

    /// Stage recorded on a nested build failure
    pub fn stage(&self) -> Option<BuildStage> {
        match self {
            ConfigError::NestedBuild { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Innermost error, skipping every nested stage wrapper
    pub fn root_cause(&self) -> &ConfigError {
        let mut current = self;
        while let ConfigError::NestedBuild { source, .. } = current {
            current = source;
        }
        current
    }

    /// Stages traversed from the outermost wrapper down to the root cause
    pub fn stages(&self) -> Vec<BuildStage> {
        let mut stages = Vec::new();
        let mut current = self;
        while let ConfigError::NestedBuild { stage, source } = current {
            stages.push(*stage);
            current = source;
        }
        stages
    }
}
