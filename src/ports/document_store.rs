//! Document Store Port - Interface for persisting drafts and templates.
//!
//! Every method is a single request: no retries, no caching. Bodies are
//! full documents and the store applies last-writer-wins.

use async_trait::async_trait;

use crate::domain::document::Document;
use crate::domain::foundation::{DocumentId, ErrorCode};

/// Errors that can occur during document store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Store responded with {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Error code reported to the user.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::NotFound(_) => ErrorCode::DocumentNotFound,
            StoreError::Network(_) | StoreError::Server { .. } | StoreError::Decode(_) => {
                ErrorCode::StoreUnavailable
            }
        }
    }
}

/// Port for the remote draft/template store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a draft by id
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the store has no such draft
    async fn fetch_draft(&self, id: &DocumentId) -> Result<Document, StoreError>;

    /// Create a draft
    ///
    /// # Returns
    /// The stored draft, carrying its assigned id
    async fn create_draft(&self, document: &Document) -> Result<Document, StoreError>;

    /// Replace the stored draft with `document`
    ///
    /// # Returns
    /// The draft as stored, including fields the store fills in
    async fn save_draft(&self, id: &DocumentId, document: &Document) -> Result<Document, StoreError>;

    /// Delete a draft
    async fn delete_draft(&self, id: &DocumentId) -> Result<(), StoreError>;

    /// List all drafts
    async fn list_drafts(&self) -> Result<Vec<Document>, StoreError>;

    /// Create a template
    ///
    /// # Returns
    /// The stored template, carrying its assigned id
    async fn create_template(&self, document: &Document) -> Result<Document, StoreError>;

    /// Replace an existing template
    ///
    /// # Returns
    /// The template as stored
    async fn update_template(
        &self,
        id: &DocumentId,
        document: &Document,
    ) -> Result<Document, StoreError>;

    /// Delete a template
    async fn delete_template(&self, id: &DocumentId) -> Result<(), StoreError>;

    /// List all templates
    async fn list_templates(&self) -> Result<Vec<Document>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_document_not_found() {
        let err = StoreError::NotFound(DocumentId::parse("42").unwrap());
        assert_eq!(err.code(), ErrorCode::DocumentNotFound);
        assert_eq!(err.to_string(), "Document not found: 42");
    }

    #[test]
    fn transport_failures_map_to_store_unavailable() {
        let err = StoreError::Server {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
        assert!(err.to_string().contains("503"));
    }
}
