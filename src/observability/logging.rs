//! # Structured Logging
//!
//! Span macros and startup logging built on the tracing ecosystem.

/// Create a tracing span for a configuration build.
///
/// ```rust,ignore
/// let span = build_span!("build_outbound_listener", port = %port);
/// ```
#[macro_export]
macro_rules! build_span {
    ($operation:expr) => {
        tracing::info_span!(
            "config_build",
            operation = %$operation,
            build_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::info_span!(
            "config_build",
            operation = %$operation,
            build_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

/// Log the effective outbound settings at startup
pub fn log_settings_info(settings: &crate::config::OutboundSettings) {
    tracing::info!(
        outbound_port = %settings.outbound_port,
        internal_services = settings.internal_services.len(),
        "grpc-egress outbound configuration"
    );
}
