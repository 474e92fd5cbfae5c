//! Outbound listener using envoy-types
//!
//! The outbound listener is bound to the loopback interface only. Local
//! processes send their internal gRPC calls through it so those calls cross
//! the same proxy as external traffic.

use envoy_types::pb::envoy::config::core::v3::{
    address::Address as AddressType, socket_address::PortSpecifier, Address, SocketAddress,
};
use envoy_types::pb::envoy::config::listener::v3::{FilterChain, Listener};
use serde::Serialize;

use crate::errors::{BuildStage, ConfigError};
use crate::xds::connection_manager::{build_connection_manager, FilterDescriptor};
use crate::xds::route_table::RouteTable;

/// Name of the outbound listener and of its filter chain
pub const OUTBOUND_LISTENER_NAME: &str = "outbound-ingress";
pub const LOOPBACK_ADDRESS: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChainDescriptor {
    pub name: String,
    pub filters: Vec<FilterDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerDescriptor {
    pub name: String,
    pub bind_address: String,
    pub bind_port: u16,
    pub filter_chains: Vec<FilterChainDescriptor>,
}

/// Parse a configured port, accepting integers in `1..=65535` only
pub fn parse_port(value: &str) -> Result<u16, ConfigError> {
    let port = value.parse::<u16>().map_err(|err| ConfigError::invalid_port(value, err))?;
    if port == 0 {
        return Err(ConfigError::invalid_port(value, "port must be between 1 and 65535"));
    }
    Ok(port)
}

/// Build the loopback outbound listener on `port`.
///
/// A malformed port is fatal. Connection manager failures are wrapped with
/// [`BuildStage::ConnectionManager`].
pub fn build_outbound_listener(
    port: &str,
    table: &RouteTable,
) -> Result<ListenerDescriptor, ConfigError> {
    let bind_port = parse_port(port)?;

    let filter = build_connection_manager(table)
        .map_err(|err| ConfigError::nested(BuildStage::ConnectionManager, err))?;

    Ok(ListenerDescriptor {
        name: OUTBOUND_LISTENER_NAME.to_string(),
        bind_address: LOOPBACK_ADDRESS.to_string(),
        bind_port,
        filter_chains: vec![FilterChainDescriptor {
            name: OUTBOUND_LISTENER_NAME.to_string(),
            filters: vec![filter],
        }],
    })
}

impl ListenerDescriptor {
    /// `address:port` the listener binds to
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }

    /// Total route count across every connection manager in the listener
    pub fn route_count(&self) -> usize {
        self.filter_chains
            .iter()
            .flat_map(|fc| fc.filters.iter())
            .map(|f| f.config.route_config.route_count())
            .sum()
    }

    /// Convert to envoy-types Listener
    pub fn to_envoy_listener(&self) -> Listener {
        let socket_address = SocketAddress {
            address: self.bind_address.clone(),
            port_specifier: Some(PortSpecifier::PortValue(u32::from(self.bind_port))),
            ..Default::default()
        };

        Listener {
            name: self.name.clone(),
            address: Some(Address { address: Some(AddressType::SocketAddress(socket_address)) }),
            filter_chains: self.filter_chains.iter().map(|fc| fc.to_envoy_filter_chain()).collect(),
            ..Default::default()
        }
    }
}

impl FilterChainDescriptor {
    fn to_envoy_filter_chain(&self) -> FilterChain {
        FilterChain {
            name: self.name.clone(),
            filters: self.filters.iter().map(|f| f.to_envoy_filter()).collect(),
            ..Default::default()
        }
    }
}
