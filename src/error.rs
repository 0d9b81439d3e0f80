//! Error types for the geotextile assistant.

use std::time::Duration;

/// Startup error: anything that stops a session from being built.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Topic catalog errors.
///
/// All of these mean the static configuration is broken. They are raised
/// while the catalog is built, never in the middle of a dialogue.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Topic not found: {key}")]
    NotFound { key: String },

    #[error("Catalog integrity violation: {0}")]
    Integrity(String),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Classification gateway errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("Connection to classifier failed: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Malformed classifier response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Classifier timed out after {after:?}")]
    Timeout { after: Duration },
}

/// Rejected user input. The dialogue never advances on one of these.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Choice {index} is out of range ({available} available)")]
    InvalidChoice { index: usize, available: usize },

    #[error("Invalid value {input:?}: {reason}")]
    InvalidValue { input: String, reason: String },

    #[error("No parameter matches {input:?}")]
    UnrecognizedParameterName { input: String },

    #[error("Not accepting input while {phase}")]
    NotAcceptingInput { phase: String },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
