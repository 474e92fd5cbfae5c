//! # Error Handling
//!
//! Error types for the outbound listener builder, defined with `thiserror`.
//! Builder failures are [`ConfigError`]s; the crate level [`Error`] adds the
//! settings, I/O and serialization failures of the surrounding tooling.

mod types;

pub use types::{BuildStage, ConfigError, ConfigErrorKind};

/// Custom result type for grpc-egress operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for grpc-egress
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Outbound configuration build errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Settings loading errors (files and environment)
    #[error("Settings error: {0}")]
    Settings(#[from] ::config::ConfigError),

    /// Settings validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Builder error category, if this is a builder failure
    pub fn config_kind(&self) -> Option<ConfigErrorKind> {
        match self {
            Error::Config(err) => Some(err.kind()),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::validation(format!("Validation failed: {}", errors))
    }
}
