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

    #[error("Invalid socket address '{0}'")]
    InvalidSocketAddr(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Model base URL must be http(s)")]
    InvalidModelUrl,

    #[error("Model attempt count must be at least 1")]
    InvalidAttemptCount,

    #[error("Model backoff ceiling must be positive and not below the multiplier")]
    InvalidBackoff,

    #[error("Request timeout of {request_secs}s is below the {required_secs}s a model call may take")]
    RequestTimeoutBelowModelBudget { request_secs: u64, required_secs: u64 },
}
