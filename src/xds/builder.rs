//! Outbound configuration builder
//!
//! [`OutboundBuilder`] owns the route table and runs the listener build
//! against it. It holds no mutable state: concurrent reloads can share one
//! builder, and identical input always yields identical descriptors.

use tracing::{info, warn};

use crate::build_span;
use crate::config::OutboundSettings;
use crate::errors::ConfigError;
use crate::xds::listener::{self, ListenerDescriptor};
use crate::xds::route_table::RouteTable;

#[derive(Debug, Clone, Default)]
pub struct OutboundBuilder {
    table: RouteTable,
}

impl OutboundBuilder {
    /// Create a builder over an explicit route table
    pub fn new(table: RouteTable) -> Self {
        Self { table }
    }

    /// Default table extended with the configured internal services
    pub fn from_settings(settings: &OutboundSettings) -> Result<Self, ConfigError> {
        let table = settings
            .internal_services
            .iter()
            .cloned()
            .try_fold(RouteTable::outbound_default(), RouteTable::with_internal_service)?;
        Ok(Self::new(table))
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Build the outbound listener for `outbound_port`
    pub fn build_outbound_listener(
        &self,
        outbound_port: &str,
    ) -> Result<ListenerDescriptor, ConfigError> {
        let span = build_span!("build_outbound_listener", port = %outbound_port);
        let _guard = span.enter();

        match listener::build_outbound_listener(outbound_port, &self.table) {
            Ok(descriptor) => {
                info!(
                    listener = %descriptor.name,
                    address = %descriptor.socket_address(),
                    routes = descriptor.route_count(),
                    "Built outbound listener"
                );
                Ok(descriptor)
            }
            Err(err) => {
                warn!(error = %err, kind = %err.kind(), "Failed to build outbound listener");
                Err(err)
            }
        }
    }
}

/// Build the outbound listener described by `settings`
pub fn build_from_settings(settings: &OutboundSettings) -> Result<ListenerDescriptor, ConfigError> {
    OutboundBuilder::from_settings(settings)?.build_outbound_listener(&settings.outbound_port)
}
