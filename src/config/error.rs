//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid store base URL (must start with http:// or https://)")]
    InvalidBaseUrl,

    #[error("Invalid API prefix (must be empty or start with '/')")]
    InvalidApiPrefix,

    #[error("Invalid reviser base URL (must start with http:// or https://)")]
    InvalidReviserUrl,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("History limit must be between 1 and {max}")]
    InvalidHistoryLimit { max: usize },

    #[error("Notice duration must be positive")]
    InvalidNoticeDuration,

    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),
}
