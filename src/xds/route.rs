//! Outbound route configuration using envoy-types
//!
//! Expands a [`RouteTable`] into one gRPC-only prefix route per declared
//! prefix and wraps them in a single wildcard virtual host. Output order is
//! table order: Envoy evaluates routes first-match, so this is what keeps
//! the catch-all route last.

use envoy_types::pb::envoy::config::route::v3::{
    route::Action, route_action::ClusterSpecifier, route_match::GrpcRouteMatchOptions,
    route_match::PathSpecifier, Route, RouteAction, RouteConfiguration, RouteMatch, VirtualHost,
};
use envoy_types::pb::google::protobuf::Duration as ProtoDuration;
use serde::Serialize;
use std::time::Duration;

use crate::errors::ConfigError;
use crate::xds::route_table::{RouteTable, RouteTimeout, MAX_ROUTE_TIMEOUT};

/// Name of the outbound route configuration
pub const OUTBOUND_ROUTE_CONFIG_NAME: &str = "grpc";
/// Name of the outbound virtual host
pub const OUTBOUND_VIRTUAL_HOST_NAME: &str = "grpc";
pub const WILDCARD_DOMAIN: &str = "*";

/// A single prefix route derived from one (definition, prefix) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMatchRule {
    /// Owning cluster name, for debugging only; not unique
    pub name: String,
    pub prefix: String,
    pub grpc_only: bool,
    pub cluster: String,
    pub request_timeout: RouteTimeout,
    pub idle_timeout: RouteTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VirtualHostConfig {
    pub name: String,
    pub domains: Vec<String>,
    pub routes: Vec<RouteMatchRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteConfig {
    pub name: String,
    pub virtual_hosts: Vec<VirtualHostConfig>,
}

/// Flatten the table into routes, preserving definition and prefix order.
pub fn build_routes(table: &RouteTable) -> Vec<RouteMatchRule> {
    let mut routes = Vec::with_capacity(table.prefix_count());
    for definition in table.definitions() {
        for prefix in &definition.path_prefixes {
            routes.push(RouteMatchRule {
                name: definition.cluster_name.clone(),
                prefix: prefix.clone(),
                grpc_only: true,
                cluster: definition.cluster_name.clone(),
                request_timeout: definition.timeouts.request_timeout,
                idle_timeout: definition.timeouts.idle_timeout,
            });
        }
    }
    routes
}

/// Build the outbound route configuration: one `*` virtual host holding
/// every route of the table.
pub fn build_route_configuration(table: &RouteTable) -> Result<RouteConfig, ConfigError> {
    let routes = build_routes(table);
    if routes.is_empty() {
        return Err(ConfigError::invalid_route_table("route table produced no routes"));
    }

    Ok(RouteConfig {
        name: OUTBOUND_ROUTE_CONFIG_NAME.to_string(),
        virtual_hosts: vec![VirtualHostConfig {
            name: OUTBOUND_VIRTUAL_HOST_NAME.to_string(),
            domains: vec![WILDCARD_DOMAIN.to_string()],
            routes,
        }],
    })
}

impl RouteConfig {
    /// Convert to envoy-types RouteConfiguration
    pub fn to_envoy_route_configuration(&self) -> RouteConfiguration {
        RouteConfiguration {
            name: self.name.clone(),
            virtual_hosts: self.virtual_hosts.iter().map(|vh| vh.to_envoy_virtual_host()).collect(),
            ..Default::default()
        }
    }

    pub fn route_count(&self) -> usize {
        self.virtual_hosts.iter().map(|vh| vh.routes.len()).sum()
    }
}

impl VirtualHostConfig {
    fn to_envoy_virtual_host(&self) -> VirtualHost {
        VirtualHost {
            name: self.name.clone(),
            domains: self.domains.clone(),
            routes: self.routes.iter().map(|r| r.to_envoy_route()).collect(),
            ..Default::default()
        }
    }
}

impl RouteMatchRule {
    fn to_envoy_route(&self) -> Route {
        let route_match = RouteMatch {
            path_specifier: Some(PathSpecifier::Prefix(self.prefix.clone())),
            grpc: self.grpc_only.then(GrpcRouteMatchOptions::default),
            ..Default::default()
        };

        #[allow(deprecated)]
        let route_action = RouteAction {
            cluster_specifier: Some(ClusterSpecifier::Cluster(self.cluster.clone())),
            timeout: Some(proto_duration(self.request_timeout.as_duration())),
            idle_timeout: Some(proto_duration(self.idle_timeout.as_duration())),
            ..Default::default()
        };

        Route {
            name: self.name.clone(),
            r#match: Some(route_match),
            action: Some(Action::Route(route_action)),
            ..Default::default()
        }
    }
}

/// Convert to a protobuf duration, clamped to the largest value Envoy accepts
pub(crate) fn proto_duration(duration: Duration) -> ProtoDuration {
    let duration = duration.min(MAX_ROUTE_TIMEOUT);
    ProtoDuration {
        seconds: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
        nanos: i32::try_from(duration.subsec_nanos()).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigErrorKind;
    use crate::xds::route_table::{
        ClusterRouteDefinition, RouteTimeouts, AUTHORIZE_CLUSTER, CONTROL_PLANE_GRPC_CLUSTER,
        DATABROKER_CLUSTER,
    };

    #[test]
    fn test_routes_follow_table_order() {
        let routes = build_routes(&RouteTable::outbound_default());
        let expanded: Vec<_> =
            routes.iter().map(|r| (r.cluster.as_str(), r.prefix.as_str())).collect();

        assert_eq!(
            expanded,
            vec![
                (AUTHORIZE_CLUSTER, "/envoy.service.auth.v3.Authorization/"),
                (DATABROKER_CLUSTER, "/databroker.DataBrokerService/"),
                (DATABROKER_CLUSTER, "/directory.DirectoryService/"),
                (DATABROKER_CLUSTER, "/registry.Registry/"),
                (CONTROL_PLANE_GRPC_CLUSTER, "/"),
            ]
        );
    }

    #[test]
    fn test_default_routes_are_grpc_only_without_timeouts() {
        for route in build_routes(&RouteTable::outbound_default()) {
            assert!(route.grpc_only);
            assert_eq!(route.name, route.cluster);
            assert!(route.request_timeout.is_disabled());
            assert!(route.idle_timeout.is_disabled());
        }
    }

    #[test]
    fn test_definition_timeouts_are_carried() {
        let timeouts = RouteTimeouts {
            request_timeout: RouteTimeout::After(Duration::from_secs(30)),
            idle_timeout: RouteTimeout::Disabled,
        };
        let table = RouteTable::new(vec![ClusterRouteDefinition::new("unary", ["/unary.Svc/"])
            .with_timeouts(timeouts)])
        .unwrap();

        let routes = build_routes(&table);
        assert_eq!(routes[0].request_timeout, RouteTimeout::After(Duration::from_secs(30)));
        assert_eq!(routes[0].idle_timeout, RouteTimeout::Disabled);
    }

    #[test]
    fn test_route_configuration_has_single_wildcard_host() {
        let config = build_route_configuration(&RouteTable::outbound_default()).unwrap();
        assert_eq!(config.name, OUTBOUND_ROUTE_CONFIG_NAME);
        assert_eq!(config.virtual_hosts.len(), 1);

        let vhost = &config.virtual_hosts[0];
        assert_eq!(vhost.name, OUTBOUND_VIRTUAL_HOST_NAME);
        assert_eq!(vhost.domains, vec!["*".to_string()]);
        assert_eq!(config.route_count(), 5);
    }

    #[test]
    fn test_empty_table_fails() {
        let err = build_route_configuration(&RouteTable::new(Vec::new()).unwrap())
            .expect_err("empty table");
        assert_eq!(err.kind(), ConfigErrorKind::InvalidRouteTable);
    }

    #[test]
    fn test_envoy_route_conversion() {
        let config = build_route_configuration(&RouteTable::outbound_default()).unwrap();
        let envoy = config.to_envoy_route_configuration();

        assert_eq!(envoy.name, "grpc");
        let routes = &envoy.virtual_hosts[0].routes;
        assert_eq!(routes.len(), 5);

        let last = routes.last().unwrap();
        assert_eq!(last.name, CONTROL_PLANE_GRPC_CLUSTER);
        let route_match = last.r#match.as_ref().unwrap();
        assert!(matches!(&route_match.path_specifier, Some(PathSpecifier::Prefix(p)) if p == "/"));
        assert!(route_match.grpc.is_some());

        match last.action.as_ref().unwrap() {
            Action::Route(action) => {
                assert!(matches!(
                    &action.cluster_specifier,
                    Some(ClusterSpecifier::Cluster(c)) if c == CONTROL_PLANE_GRPC_CLUSTER
                ));
                assert_eq!(action.timeout, Some(ProtoDuration { seconds: 0, nanos: 0 }));
                assert_eq!(action.idle_timeout, Some(ProtoDuration { seconds: 0, nanos: 0 }));
            }
            other => panic!("unexpected route action: {:?}", other),
        }
    }

    #[test]
    fn test_proto_duration() {
        assert_eq!(
            proto_duration(Duration::from_millis(1500)),
            ProtoDuration { seconds: 1, nanos: 500_000_000 }
        );
        assert_eq!(
            proto_duration(Duration::MAX),
            ProtoDuration { seconds: 315_576_000_000, nanos: 0 }
        );
    }

    #[test]
    fn test_sub_second_timeout_reaches_rule_and_envoy_route() {
        let table = RouteTable::new(vec![ClusterRouteDefinition::new(
            AUTHORIZE_CLUSTER,
            ["/envoy.service.auth.v3.Authorization/"],
        )
        .with_timeouts(RouteTimeouts {
            request_timeout: RouteTimeout::After(Duration::from_millis(500)),
            idle_timeout: RouteTimeout::Disabled,
        })])
        .unwrap();

        let rule = &build_routes(&table)[0];
        let json = serde_json::to_value(rule).unwrap();
        assert_eq!(json["request_timeout"], 0.5);
        assert_eq!(json["idle_timeout"], 0.0);

        match rule.to_envoy_route().action {
            Some(Action::Route(action)) => {
                assert_eq!(action.timeout, Some(ProtoDuration { seconds: 0, nanos: 500_000_000 }));
            }
            other => panic!("unexpected route action: {:?}", other),
        }
    }
}
