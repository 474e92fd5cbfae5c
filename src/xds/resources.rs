//! xDS resource encoding for the outbound listener.

use envoy_types::pb::google::protobuf::Any;
use prost::Message;
use tracing::debug;

use crate::xds::listener::ListenerDescriptor;

pub const LISTENER_TYPE_URL: &str = "type.googleapis.com/envoy.config.listener.v3.Listener";

/// Wrapper for a built Envoy resource along with its name.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltResource {
    pub name: String,
    pub resource: Any,
}

impl BuiltResource {
    pub fn into_any(self) -> Any {
        self.resource
    }

    pub fn type_url(&self) -> &str {
        &self.resource.type_url
    }

    /// Protobuf encoding of the wrapping `Any`
    pub fn encode_to_vec(&self) -> Vec<u8> {
        self.resource.encode_to_vec()
    }
}

/// Encode the outbound listener as an xDS listener resource
pub fn listener_resource(listener: &ListenerDescriptor) -> BuiltResource {
    let encoded = listener.to_envoy_listener().encode_to_vec();
    debug!(resource = %listener.name, bytes = encoded.len(), "Created listener resource");

    BuiltResource {
        name: listener.name.clone(),
        resource: Any { type_url: LISTENER_TYPE_URL.to_string(), value: encoded },
    }
}
