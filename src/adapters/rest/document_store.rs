//! HTTP Document Store - `DocumentStore` over the backend's REST API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpStoreConfig::new("http://localhost:8000/api")
//!     .with_token("secret")
//!     .with_timeout(Duration::from_secs(10));
//!
//! let store = HttpDocumentStore::new(config)?;
//! ```
//!
//! Every operation is a single request. Failures are mapped to
//! [`StoreError`] and never retried.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::domain::document::{Document, DocumentKind};
use crate::domain::foundation::DocumentId;
use crate::ports::{DocumentStore, StoreError};

/// Configuration for the HTTP document store.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Base URL including the API prefix, e.g. `http://localhost:8000/api`.
    pub endpoint: String,
    /// Optional bearer token.
    api_token: Option<SecretString>,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpStoreConfig {
    /// Creates a configuration for the given endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Builds the adapter configuration from the `store` section.
    pub fn from_config(config: &StoreConfig) -> Self {
        let mut http = Self::new(config.endpoint()).with_timeout(config.timeout());
        if let Some(token) = config.api_token.as_ref().filter(|t| !t.is_empty()) {
            http = http.with_token(token.clone());
        }
        http
    }

    /// Sets the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(SecretString::new(token.into()));
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn token(&self) -> Option<&str> {
        self.api_token.as_ref().map(|t| t.expose_secret().as_str())
    }
}

/// REST implementation of the document store.
pub struct HttpDocumentStore {
    config: HttpStoreConfig,
    base: Url,
    client: Client,
}

impl HttpDocumentStore {
    /// Creates a store client.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Network` if the endpoint is not a usable base URL
    /// or the HTTP client cannot be built.
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let base = Url::parse(&config.endpoint)
            .map_err(|e| StoreError::Network(format!("Invalid store endpoint: {}", e)))?;
        if base.cannot_be_a_base() {
            return Err(StoreError::Network(format!(
                "Invalid store endpoint: {}",
                config.endpoint
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Appends path segments to the endpoint. Ids are percent-encoded as
    /// single segments, so reserved characters never change the resource.
    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Network(format!("Invalid store endpoint: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn draft_url(&self, id: &DocumentId) -> Result<Url, StoreError> {
        self.url(&["drafts", id.as_str()])
    }

    fn template_url(&self, id: &DocumentId) -> Result<Url, StoreError> {
        self.url(&["templates", id.as_str()])
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends a request, mapping transport failures.
    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        self.authorize(request).send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Network(format!(
                    "Request timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            } else if e.is_connect() {
                StoreError::Network(format!("Connection failed: {}", e))
            } else {
                StoreError::Network(e.to_string())
            }
        })
    }

    /// Maps non-success statuses; `not_found` is used for 404 when set.
    async fn handle_response_status(
        response: Response,
        not_found: Option<&DocumentId>,
    ) -> Result<Response, StoreError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        match (status, not_found) {
            (StatusCode::NOT_FOUND, Some(id)) => Err(StoreError::NotFound(id.clone())),
            _ => {
                warn!(status = status.as_u16(), "Document store request failed");
                Err(StoreError::Server {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let response = self.send(self.client.get(self.url(&[collection])?)).await?;
        let response = Self::handle_response_status(response, None).await?;
        Self::decode(response).await
    }

    /// POSTs a new document and requires the response to carry its id.
    async fn create(
        &self,
        collection: &str,
        document: &Document,
        kind: DocumentKind,
    ) -> Result<Document, StoreError> {
        let response = self
            .send(self.client.post(self.url(&[collection])?).json(document))
            .await?;
        let response = Self::handle_response_status(response, None).await?;
        let created: Document = Self::decode(response).await?;
        if !created.is_persisted() {
            return Err(StoreError::Decode(format!(
                "created {} entry carries no id",
                collection
            )));
        }
        Ok(created.with_kind(kind))
    }

    /// PUTs the full document and decodes the stored copy.
    async fn replace(
        &self,
        url: Url,
        id: &DocumentId,
        document: &Document,
        kind: DocumentKind,
    ) -> Result<Document, StoreError> {
        let response = self.send(self.client.put(url).json(document)).await?;
        let response = Self::handle_response_status(response, Some(id)).await?;
        let stored: Document = Self::decode(response).await?;
        Ok(stored.with_id(id.clone()).with_kind(kind))
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch_draft(&self, id: &DocumentId) -> Result<Document, StoreError> {
        debug!(%id, "Fetching draft");
        let response = self.send(self.client.get(self.draft_url(id)?)).await?;
        let response = Self::handle_response_status(response, Some(id)).await?;
        Self::decode(response).await
    }

    async fn create_draft(&self, document: &Document) -> Result<Document, StoreError> {
        debug!(document_type = %document.document_type(), "Creating draft");
        self.create("drafts", document, DocumentKind::Draft).await
    }

    async fn save_draft(&self, id: &DocumentId, document: &Document) -> Result<Document, StoreError> {
        debug!(%id, "Saving draft");
        self.replace(self.draft_url(id)?, id, document, DocumentKind::Draft)
            .await
    }

    async fn delete_draft(&self, id: &DocumentId) -> Result<(), StoreError> {
        debug!(%id, "Deleting draft");
        let response = self.send(self.client.delete(self.draft_url(id)?)).await?;
        Self::handle_response_status(response, Some(id)).await?;
        Ok(())
    }

    async fn list_drafts(&self) -> Result<Vec<Document>, StoreError> {
        self.list("drafts").await
    }

    async fn create_template(&self, document: &Document) -> Result<Document, StoreError> {
        debug!(document_type = %document.document_type(), "Creating template");
        self.create("templates", document, DocumentKind::Template)
            .await
    }

    async fn update_template(
        &self,
        id: &DocumentId,
        document: &Document,
    ) -> Result<Document, StoreError> {
        debug!(%id, "Updating template");
        self.replace(self.template_url(id)?, id, document, DocumentKind::Template)
            .await
    }

    async fn delete_template(&self, id: &DocumentId) -> Result<(), StoreError> {
        debug!(%id, "Deleting template");
        let response = self.send(self.client.delete(self.template_url(id)?)).await?;
        Self::handle_response_status(response, Some(id)).await?;
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<Document>, StoreError> {
        let templates = self.list("templates").await?;
        Ok(templates
            .into_iter()
            .map(|doc| doc.with_kind(DocumentKind::Template))
            .collect())
    }
}
