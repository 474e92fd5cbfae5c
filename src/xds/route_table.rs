//! Outbound route table
//!
//! The route table is the single source of truth for which internal gRPC
//! services are reachable through the loopback outbound listener. Entries are
//! evaluated first-match in declaration order, so a catch-all `/` prefix is
//! only accepted as the very last prefix of the table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::Validate;

use crate::errors::ConfigError;

/// Authorization service cluster
pub const AUTHORIZE_CLUSTER: &str = "pomerium-authorize";
/// Data broker service cluster
pub const DATABROKER_CLUSTER: &str = "pomerium-databroker";
/// Control plane gRPC cluster, target of the catch-all route
pub const CONTROL_PLANE_GRPC_CLUSTER: &str = "pomerium-control-plane-grpc";

/// Prefix matching every request path
pub const CATCH_ALL_PREFIX: &str = "/";

/// Largest duration Envoy accepts, about 10000 years
pub const MAX_ROUTE_TIMEOUT: Duration = Duration::from_secs(315_576_000_000);

/// Per-route timeout. `Disabled` is sent to Envoy as a zero duration.
///
/// Serialized as fractional seconds with `0` meaning disabled, so `0.5` is a
/// 500ms timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum RouteTimeout {
    #[default]
    Disabled,
    After(Duration),
}

impl RouteTimeout {
    pub fn is_disabled(&self) -> bool {
        match self {
            RouteTimeout::Disabled => true,
            RouteTimeout::After(duration) => duration.is_zero(),
        }
    }

    /// Duration to encode, zero when disabled
    pub fn as_duration(&self) -> Duration {
        match self {
            RouteTimeout::Disabled => Duration::ZERO,
            RouteTimeout::After(duration) => *duration,
        }
    }
}

impl From<Duration> for RouteTimeout {
    fn from(duration: Duration) -> Self {
        if duration.is_zero() {
            RouteTimeout::Disabled
        } else {
            RouteTimeout::After(duration)
        }
    }
}

impl TryFrom<f64> for RouteTimeout {
    type Error = String;

    fn try_from(seconds: f64) -> Result<Self, Self::Error> {
        if seconds > MAX_ROUTE_TIMEOUT.as_secs_f64() {
            return Err(format!(
                "route timeout {}s exceeds the maximum of {}s",
                seconds,
                MAX_ROUTE_TIMEOUT.as_secs()
            ));
        }
        Duration::try_from_secs_f64(seconds)
            .map(RouteTimeout::from)
            .map_err(|e| format!("invalid route timeout {}: {}", seconds, e))
    }
}

impl From<RouteTimeout> for f64 {
    fn from(timeout: RouteTimeout) -> Self {
        timeout.as_duration().as_secs_f64()
    }
}

impl fmt::Display for RouteTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_disabled() {
            write!(f, "off")
        } else {
            write!(f, "{:?}", self.as_duration())
        }
    }
}

/// Request and idle timeouts applied to every route of a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RouteTimeouts {
    #[serde(default)]
    pub request_timeout: RouteTimeout,
    #[serde(default)]
    pub idle_timeout: RouteTimeout,
}

impl RouteTimeouts {
    /// Both timeouts disabled, for long-lived gRPC streams
    pub const fn disabled() -> Self {
        Self { request_timeout: RouteTimeout::Disabled, idle_timeout: RouteTimeout::Disabled }
    }
}

/// A logical upstream cluster and the gRPC path prefixes routed to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ClusterRouteDefinition {
    #[validate(length(min = 1, message = "Cluster name cannot be empty"))]
    pub cluster_name: String,

    #[validate(length(min = 1, message = "At least one path prefix is required"))]
    pub path_prefixes: Vec<String>,

    #[serde(default)]
    pub timeouts: RouteTimeouts,
}

impl ClusterRouteDefinition {
    /// Definition with both timeouts disabled
    pub fn new<C, I, P>(cluster_name: C, path_prefixes: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            cluster_name: cluster_name.into(),
            path_prefixes: path_prefixes.into_iter().map(Into::into).collect(),
            timeouts: RouteTimeouts::disabled(),
        }
    }

    pub fn with_timeouts(mut self, timeouts: RouteTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn has_catch_all(&self) -> bool {
        self.path_prefixes.iter().any(|prefix| prefix == CATCH_ALL_PREFIX)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.cluster_name.trim().is_empty() {
            return Err(ConfigError::invalid_route_table("cluster name cannot be empty"));
        }
        if self.path_prefixes.is_empty() {
            return Err(ConfigError::invalid_route_table(format!(
                "cluster '{}' declares no path prefixes",
                self.cluster_name
            )));
        }
        for prefix in &self.path_prefixes {
            if !prefix.starts_with('/') {
                return Err(ConfigError::invalid_route_table(format!(
                    "prefix '{}' for cluster '{}' must start with '/'",
                    prefix, self.cluster_name
                )));
            }
        }
        for timeout in [self.timeouts.request_timeout, self.timeouts.idle_timeout] {
            if timeout.as_duration() > MAX_ROUTE_TIMEOUT {
                return Err(ConfigError::invalid_route_table(format!(
                    "timeout {:?} for cluster '{}' exceeds the maximum of {}s",
                    timeout.as_duration(),
                    self.cluster_name,
                    MAX_ROUTE_TIMEOUT.as_secs()
                )));
            }
        }
        Ok(())
    }
}

/// Ordered rule table for the outbound listener.
///
/// Invariant: a catch-all prefix, if present, is the last prefix of the last
/// definition. Construction and insertion both enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    definitions: Vec<ClusterRouteDefinition>,
}

impl RouteTable {
    /// Validate and wrap an ordered list of definitions
    pub fn new(definitions: Vec<ClusterRouteDefinition>) -> Result<Self, ConfigError> {
        for definition in &definitions {
            definition.check()?;
        }

        let total = definitions.iter().map(|d| d.path_prefixes.len()).sum::<usize>();
        let misplaced = definitions
            .iter()
            .flat_map(|d| d.path_prefixes.iter().map(move |p| (d, p)))
            .enumerate()
            .find(|(position, (_, prefix))| {
                prefix.as_str() == CATCH_ALL_PREFIX && position + 1 != total
            });

        if let Some((position, (definition, _))) = misplaced {
            return Err(ConfigError::invalid_route_table(format!(
                "catch-all prefix for cluster '{}' is at position {} of {}; it must be declared last",
                definition.cluster_name,
                position + 1,
                total
            )));
        }

        Ok(Self { definitions })
    }

    /// The routing table of the outbound gRPC listener
    pub fn outbound_default() -> Self {
        Self {
            definitions: vec![
                ClusterRouteDefinition::new(
                    AUTHORIZE_CLUSTER,
                    ["/envoy.service.auth.v3.Authorization/"],
                ),
                ClusterRouteDefinition::new(
                    DATABROKER_CLUSTER,
                    [
                        "/databroker.DataBrokerService/",
                        "/directory.DirectoryService/",
                        "/registry.Registry/",
                    ],
                ),
                ClusterRouteDefinition::new(CONTROL_PLANE_GRPC_CLUSTER, [CATCH_ALL_PREFIX]),
            ],
        }
    }

    /// Register an additional internal service ahead of the catch-all entry
    pub fn with_internal_service(
        mut self,
        definition: ClusterRouteDefinition,
    ) -> Result<Self, ConfigError> {
        definition.check()?;
        if definition.has_catch_all() {
            return Err(ConfigError::invalid_route_table(format!(
                "internal service '{}' cannot declare the catch-all prefix",
                definition.cluster_name
            )));
        }

        let position = match self.definitions.last() {
            Some(last) if last.has_catch_all() => self.definitions.len() - 1,
            _ => self.definitions.len(),
        };
        self.definitions.insert(position, definition);
        Ok(self)
    }

    pub fn definitions(&self) -> &[ClusterRouteDefinition] {
        &self.definitions
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Number of routes the table expands into
    pub fn prefix_count(&self) -> usize {
        self.definitions.iter().map(|d| d.path_prefixes.len()).sum()
    }

    /// Definition owning the catch-all prefix
    pub fn catch_all(&self) -> Option<&ClusterRouteDefinition> {
        self.definitions.last().filter(|d| d.has_catch_all())
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::outbound_default()
    }
}
