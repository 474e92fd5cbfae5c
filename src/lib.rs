//! # grpc-egress
//!
//! Builds the loopback "outbound" listener of the data-plane Envoy proxy. Local
//! processes send their internal gRPC calls (authorization checks, data broker
//! and control plane traffic) to this listener so they traverse the same proxy
//! fabric as external requests.
//!
//! ## Architecture
//!
//! ```text
//! OutboundSettings → OutboundBuilder → ListenerDescriptor → envoy-types Listener → xDS
//!                          ↓
//!                      RouteTable
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use grpc_egress::xds::{OutboundBuilder, listener_resource};
//!
//! let listener = OutboundBuilder::default().build_outbound_listener("8443")?;
//! assert_eq!(listener.socket_address(), "127.0.0.1:8443");
//!
//! let resource = listener_resource(&listener);
//! assert_eq!(resource.type_url(), grpc_egress::xds::LISTENER_TYPE_URL);
//! # Ok::<(), grpc_egress::errors::ConfigError>(())
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod xds;

// Re-export commonly used types and traits
pub use crate::config::{ObservabilityConfig, OutboundSettings};
pub use crate::errors::{BuildStage, ConfigError, ConfigErrorKind, Error, Result};
pub use crate::observability::init_logging;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
