//! HTTP connection manager for the outbound listener
//!
//! Wraps the outbound route configuration in the
//! `envoy.filters.network.http_connection_manager` network filter. The codec is
//! auto-detected so HTTP/1 and native gRPC callers share the listener, and the
//! router filter terminates the HTTP filter chain.

use envoy_types::pb::envoy::config::listener::v3::{filter::ConfigType as FilterConfigType, Filter};
use envoy_types::pb::envoy::extensions::filters::network::http_connection_manager::v3::{
    http_connection_manager::{CodecType, RouteSpecifier},
    HttpConnectionManager, HttpFilter,
};
use serde::Serialize;
use std::time::Duration;

use crate::errors::{BuildStage, ConfigError};
use crate::xds::filters::{any_from_message, router_filter, ROUTER_FILTER_NAME};
use crate::xds::route::{build_route_configuration, proto_duration, RouteConfig};
use crate::xds::route_table::RouteTable;

pub const HTTP_CONNECTION_MANAGER_FILTER_NAME: &str =
    "envoy.filters.network.http_connection_manager";
pub const HTTP_CONNECTION_MANAGER_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager";

/// Stat prefix for the outbound connection manager
pub const OUTBOUND_STAT_PREFIX: &str = "grpc_egress";

/// Upper bound from the first to the last byte of a request. This guards
/// against stalled senders; it does not limit stream duration.
pub const OUTBOUND_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodecKind {
    Auto,
}

impl CodecKind {
    fn to_envoy(self) -> CodecType {
        match self {
            CodecKind::Auto => CodecType::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpFilterKind {
    Router,
}

impl HttpFilterKind {
    pub fn name(&self) -> &'static str {
        match self {
            HttpFilterKind::Router => ROUTER_FILTER_NAME,
        }
    }

    fn to_envoy(self) -> HttpFilter {
        match self {
            HttpFilterKind::Router => router_filter(),
        }
    }
}

/// Typed configuration of the outbound connection manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HttpConnectionManagerDescriptor {
    pub stat_prefix: String,
    pub codec: CodecKind,
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    pub route_config: RouteConfig,
    pub http_filters: Vec<HttpFilterKind>,
}

/// A named network filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDescriptor {
    pub name: String,
    pub config: HttpConnectionManagerDescriptor,
}

/// Build the outbound connection manager filter.
///
/// Route configuration failures are wrapped with
/// [`BuildStage::RouteConfiguration`].
pub fn build_connection_manager(table: &RouteTable) -> Result<FilterDescriptor, ConfigError> {
    let route_config = build_route_configuration(table)
        .map_err(|err| ConfigError::nested(BuildStage::RouteConfiguration, err))?;

    Ok(FilterDescriptor {
        name: HTTP_CONNECTION_MANAGER_FILTER_NAME.to_string(),
        config: HttpConnectionManagerDescriptor {
            stat_prefix: OUTBOUND_STAT_PREFIX.to_string(),
            codec: CodecKind::Auto,
            request_timeout: OUTBOUND_REQUEST_TIMEOUT,
            route_config,
            http_filters: vec![HttpFilterKind::Router],
        },
    })
}

impl HttpConnectionManagerDescriptor {
    /// Convert to envoy-types HttpConnectionManager
    pub fn to_envoy(&self) -> HttpConnectionManager {
        HttpConnectionManager {
            codec_type: self.codec.to_envoy() as i32,
            stat_prefix: self.stat_prefix.clone(),
            request_timeout: Some(proto_duration(self.request_timeout)),
            route_specifier: Some(RouteSpecifier::RouteConfig(
                self.route_config.to_envoy_route_configuration(),
            )),
            http_filters: self.http_filters.iter().map(|f| f.to_envoy()).collect(),
            ..Default::default()
        }
    }
}

impl FilterDescriptor {
    /// Convert to envoy-types Filter with a typed HttpConnectionManager config
    pub fn to_envoy_filter(&self) -> Filter {
        Filter {
            name: self.name.clone(),
            config_type: Some(FilterConfigType::TypedConfig(any_from_message(
                HTTP_CONNECTION_MANAGER_TYPE_URL,
                &self.config.to_envoy(),
            ))),
        }
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigErrorKind;
    use envoy_types::pb::google::protobuf::Duration as ProtoDuration;
    use prost::Message;

    #[test]
    fn test_connection_manager_defaults() {
        let filter = build_connection_manager(&RouteTable::outbound_default()).unwrap();

        assert_eq!(filter.name, HTTP_CONNECTION_MANAGER_FILTER_NAME);
        assert_eq!(filter.config.stat_prefix, "grpc_egress");
        assert_eq!(filter.config.codec, CodecKind::Auto);
        assert_eq!(filter.config.request_timeout, Duration::from_secs(15));
        assert_eq!(filter.config.http_filters, vec![HttpFilterKind::Router]);
        assert_eq!(filter.config.route_config.route_count(), 5);
    }

    #[test]
    fn test_route_failure_is_wrapped() {
        let err = build_connection_manager(&RouteTable::new(Vec::new()).unwrap())
            .expect_err("empty table");

        assert_eq!(err.kind(), ConfigErrorKind::NestedBuildFailure);
        assert_eq!(err.stage(), Some(BuildStage::RouteConfiguration));
        assert_eq!(err.root_cause().kind(), ConfigErrorKind::InvalidRouteTable);
    }

    #[test]
    fn test_typed_config_decodes() {
        let filter = build_connection_manager(&RouteTable::outbound_default())
            .unwrap()
            .to_envoy_filter();

        let any = match filter.config_type {
            Some(FilterConfigType::TypedConfig(any)) => any,
            other => panic!("unsupported config type in test: {:?}", other),
        };
        assert_eq!(any.type_url, HTTP_CONNECTION_MANAGER_TYPE_URL);

        let hcm = HttpConnectionManager::decode(any.value.as_slice())
            .expect("decode http connection manager");
        assert_eq!(hcm.codec_type, CodecType::Auto as i32);
        assert_eq!(hcm.stat_prefix, "grpc_egress");
        assert_eq!(hcm.request_timeout, Some(ProtoDuration { seconds: 15, nanos: 0 }));
        assert_eq!(hcm.http_filters.len(), 1);
        assert_eq!(hcm.http_filters[0].name, ROUTER_FILTER_NAME);

        match hcm.route_specifier {
            Some(RouteSpecifier::RouteConfig(rc)) => {
                assert_eq!(rc.virtual_hosts.len(), 1);
                assert_eq!(rc.virtual_hosts[0].domains, vec!["*".to_string()]);
            }
            other => panic!("expected inline route config, got {:?}", other),
        }
    }
}
