//! # Outbound xDS Configuration
//!
//! Builds the loopback listener through which local processes reach the
//! internal gRPC services. The build runs leaf-first:
//!
//! ```text
//! RouteTable → routes → RouteConfig → http connection manager → Listener
//! ```
//!
//! Every builder is a pure function of its input. Descriptors are plain values
//! that convert to envoy-types protobuf messages for delivery over xDS.

pub mod builder;
pub mod connection_manager;
pub mod filters;
pub mod listener;
pub mod resources;
pub mod route;
pub mod route_table;

pub use builder::{build_from_settings, OutboundBuilder};
pub use connection_manager::{build_connection_manager, FilterDescriptor, HttpConnectionManagerDescriptor};
pub use listener::{build_outbound_listener, FilterChainDescriptor, ListenerDescriptor};
pub use resources::{listener_resource, BuiltResource, LISTENER_TYPE_URL};
pub use route::{build_route_configuration, build_routes, RouteConfig, RouteMatchRule, VirtualHostConfig};
pub use route_table::{ClusterRouteDefinition, RouteTable, RouteTimeout, RouteTimeouts};
