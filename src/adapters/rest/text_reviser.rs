//! HTTP Text Reviser - `TextReviser` over the backend's rewrite endpoint.
//!
//! Posts `{content, instruction}` to `/gemini_edit` and expects
//! `{content}` back. The returned content must parse as rich text.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::domain::richtext;
use crate::ports::{ReviseError, TextReviser};

/// Configuration for the HTTP reviser.
#[derive(Debug, Clone)]
pub struct HttpReviserConfig {
    /// Base URL the endpoint path is appended to.
    pub endpoint: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpReviserConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    /// Builds the adapter configuration from the application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.reviser_endpoint()).with_timeout(config.reviser.timeout())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
struct ReviseRequest<'a> {
    content: &'a str,
    instruction: &'a str,
}

#[derive(Debug, Deserialize)]
struct ReviseResponse {
    content: String,
}

/// REST implementation of the text reviser.
pub struct HttpTextReviser {
    config: HttpReviserConfig,
    client: Client,
}

impl HttpTextReviser {
    /// # Errors
    ///
    /// Returns `ReviseError::Network` if the HTTP client cannot be built.
    pub fn new(config: HttpReviserConfig) -> Result<Self, ReviseError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ReviseError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn revise_url(&self) -> String {
        format!("{}/gemini_edit", self.config.endpoint)
    }

    async fn handle_response_status(response: Response) -> Result<Response, ReviseError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Revision request failed");
        Err(ReviseError::Server {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl TextReviser for HttpTextReviser {
    async fn revise(&self, content: &str, instruction: &str) -> Result<String, ReviseError> {
        debug!(instruction, "Requesting revision");
        let response = self
            .client
            .post(self.revise_url())
            .json(&ReviseRequest {
                content,
                instruction,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReviseError::Timeout
                } else if e.is_connect() {
                    ReviseError::Network(format!("Connection failed: {}", e))
                } else {
                    ReviseError::Network(e.to_string())
                }
            })?;
        let response = Self::handle_response_status(response).await?;
        let revised: ReviseResponse = response
            .json()
            .await
            .map_err(|e| ReviseError::Decode(e.to_string()))?;

        richtext::parse(&revised.content).map_err(|e| ReviseError::InvalidContent(e.to_string()))?;
        Ok(revised.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posts_to_gemini_edit() {
        let reviser = HttpTextReviser::new(HttpReviserConfig::new("http://h/api/")).unwrap();
        assert_eq!(reviser.revise_url(), "http://h/api/gemini_edit");
    }

    #[test]
    fn config_follows_application_settings() {
        let mut app = AppConfig::default();
        app.reviser.timeout_secs = 9;
        let config = HttpReviserConfig::from_config(&app);
        assert_eq!(config.endpoint, "http://localhost:8000/api");
        assert_eq!(config.timeout, Duration::from_secs(9));
    }

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(ReviseRequest {
            content: "<p>Hi</p>",
            instruction: "more formal",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"content": "<p>Hi</p>", "instruction": "more formal"}));
    }
}
