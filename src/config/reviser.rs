//! AI revision endpoint configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::store::is_http_url;

/// Text reviser configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReviserConfig {
    /// Base URL of the revision endpoint; defaults to the store endpoint
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ReviserConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate reviser configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.base_url {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidReviserUrl);
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for ReviserConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    120
}
