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
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Session TTL must be greater than zero")]
    InvalidSessionTtl,

    #[error("Sweep interval must be greater than zero")]
    InvalidSweepInterval,

    #[error("Invalid vote deck: {0}")]
    InvalidDeck(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
