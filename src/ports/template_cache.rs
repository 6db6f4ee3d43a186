//! Template Cache Port - Local key/value storage of JSON values.
//!
//! The template list page keeps its last listing under
//! [`TEMPLATE_CACHE_KEY`] so a template can be reopened by index without a
//! network round trip.

use async_trait::async_trait;

use crate::domain::document::{Document, DocumentKind};

/// Key under which the template listing is cached.
pub const TEMPLATE_CACHE_KEY: &str = "selfCustomizingTemplates";

/// Errors that can occur during cache operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(String),

    #[error("Cached value is corrupt: {0}")]
    Corrupt(String),
}

/// Port for local key/value storage
#[async_trait]
pub trait TemplateCache: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError>;

    /// Store `value` under `key`, replacing any previous value
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), CacheError>;

    /// Cached template listing; empty when nothing is cached
    ///
    /// # Errors
    /// Returns `CacheError::Corrupt` if the cached value is not a list of documents
    async fn templates(&self) -> Result<Vec<Document>, CacheError> {
        let Some(value) = self.get(TEMPLATE_CACHE_KEY).await? else {
            return Ok(Vec::new());
        };
        let templates: Vec<Document> =
            serde_json::from_value(value).map_err(|e| CacheError::Corrupt(e.to_string()))?;
        Ok(templates
            .into_iter()
            .map(|doc| doc.with_kind(DocumentKind::Template))
            .collect())
    }

    /// Replace the cached template listing
    async fn set_templates(&self, templates: &[Document]) -> Result<(), CacheError> {
        let value =
            serde_json::to_value(templates).map_err(|e| CacheError::Corrupt(e.to_string()))?;
        self.set(TEMPLATE_CACHE_KEY, value).await
    }

    /// Replace the cached entry with the same id, or append `template`
    ///
    /// Entries keep their position so cached indexes stay valid.
    async fn upsert_template(&self, template: &Document) -> Result<(), CacheError> {
        let mut templates = self.templates().await?;
        let existing = template
            .id()
            .and_then(|id| templates.iter().position(|doc| doc.id() == Some(id)));
        match existing {
            Some(index) => templates[index] = template.clone(),
            None => templates.push(template.clone()),
        }
        self.set_templates(&templates).await
    }
}
