//! Document store configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the backend, without the API prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path prefix of the REST resources
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Optional bearer token sent with every request
    pub api_token: Option<String>,
}

impl StoreConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Base URL joined with the API prefix, without a trailing slash
    pub fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_end_matches('/')
        )
    }

    /// Check if a bearer token is configured
    pub fn has_token(&self) -> bool {
        self.api_token.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Validate store configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_http_url(&self.base_url) {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(ValidationError::InvalidApiPrefix);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_prefix: default_api_prefix(),
            timeout_secs: default_timeout(),
            api_token: None,
        }
    }
}

pub(super) fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_timeout() -> u64 {
    30
}
