//! Filter helpers shared by the listener and connection manager builders.
//!
//! The outbound path carries no cross-cutting HTTP filters: the router filter
//! is the only, and terminal, entry of the HTTP filter chain.

use envoy_types::pb::envoy::extensions::filters::http::router::v3::Router as RouterFilter;
use envoy_types::pb::envoy::extensions::filters::network::http_connection_manager::v3::http_filter::ConfigType as HttpFilterConfigType;
use envoy_types::pb::envoy::extensions::filters::network::http_connection_manager::v3::HttpFilter;
use envoy_types::pb::google::protobuf::Any;
use prost::Message;

/// Envoy's canonical router filter name
pub const ROUTER_FILTER_NAME: &str = "envoy.filters.http.router";
pub const ROUTER_TYPE_URL: &str = "type.googleapis.com/envoy.extensions.filters.http.router.v3.Router";

/// Helper for building Envoy `Any` values from prost messages.
pub fn any_from_message<M: Message>(type_url: impl Into<String>, msg: &M) -> Any {
    Any { type_url: type_url.into(), value: msg.encode_to_vec() }
}

/// Terminal router filter with an explicit (default) typed config
pub fn router_filter() -> HttpFilter {
    HttpFilter {
        name: ROUTER_FILTER_NAME.to_string(),
        is_optional: false,
        disabled: false,
        config_type: Some(HttpFilterConfigType::TypedConfig(any_from_message(
            ROUTER_TYPE_URL,
            &RouterFilter::default(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Eq, Message)]
    struct TestMessage {
        #[prost(string, tag = "1")]
        field: String,
    }

    #[test]
    fn any_from_message_sets_type_url() {
        let msg = TestMessage { field: "hello".into() };
        let any = any_from_message("type.googleapis.com/test.Message", &msg);
        assert_eq!(any.type_url, "type.googleapis.com/test.Message");
        assert_eq!(TestMessage::decode(any.value.as_slice()).unwrap(), msg);
    }

    #[test]
    fn router_filter_is_typed() {
        let filter = router_filter();
        assert_eq!(filter.name, ROUTER_FILTER_NAME);
        match filter.config_type {
            Some(HttpFilterConfigType::TypedConfig(any)) => {
                assert_eq!(any.type_url, ROUTER_TYPE_URL)
            }
            other => panic!("unexpected router config: {:?}", other),
        }
    }
}
