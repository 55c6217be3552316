//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),

    #[error("Issuer URL must use HTTPS in production")]
    IssuerMustBeHttps,

    #[error("Invalid enrollment service URL")]
    InvalidEnrollmentUrl,

    #[error("Enrollment service must be configured in production")]
    EnrollmentServiceRequired,

    #[error("Invalid max frame size")]
    InvalidFrameSize,

    #[error("Internal API key too short (minimum 16 characters)")]
    InternalKeyTooShort,
}
