//! In-Memory Document Store Adapter
//!
//! Keeps drafts and templates in process memory. Used for tests and for
//! running the editor offline. Failure injection lets tests exercise the
//! session's error paths.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::sleep;

use crate::domain::document::{Document, DocumentKind};
use crate::domain::foundation::DocumentId;
use crate::ports::{DocumentStore, StoreError};

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    FetchDraft,
    CreateDraft,
    SaveDraft,
    DeleteDraft,
    ListDrafts,
    CreateTemplate,
    UpdateTemplate,
    DeleteTemplate,
    ListTemplates,
}

/// In-memory storage for drafts and templates
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    drafts: Arc<RwLock<BTreeMap<String, Document>>>,
    templates: Arc<RwLock<BTreeMap<String, Document>>>,
    failures: Arc<RwLock<HashMap<StoreOperation, StoreError>>>,
    requests: Arc<AtomicUsize>,
    latency: Duration,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets simulated latency per request.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Insert a draft under its id, replacing any previous one
    ///
    /// Drafts without an id are assigned a fresh one.
    pub async fn insert_draft(&self, draft: Document) -> DocumentId {
        let id = draft.id().cloned().unwrap_or_default();
        let draft = draft.with_id(id.clone()).with_kind(DocumentKind::Draft);
        self.drafts
            .write()
            .await
            .insert(id.as_str().to_string(), draft);
        id
    }

    /// Insert a template under its id, assigning one if missing
    pub async fn insert_template(&self, template: Document) -> DocumentId {
        let id = template.id().cloned().unwrap_or_default();
        let template = template.with_id(id.clone()).with_kind(DocumentKind::Template);
        self.templates
            .write()
            .await
            .insert(id.as_str().to_string(), template);
        id
    }

    /// Current stored draft, if any
    pub async fn draft(&self, id: &DocumentId) -> Option<Document> {
        self.drafts.read().await.get(id.as_str()).cloned()
    }

    /// Current stored template, if any
    pub async fn template(&self, id: &DocumentId) -> Option<Document> {
        self.templates.read().await.get(id.as_str()).cloned()
    }

    /// Make every subsequent call of `operation` fail with `error`
    pub async fn fail_on(&self, operation: StoreOperation, error: StoreError) {
        self.failures.write().await.insert(operation, error);
    }

    /// Remove all injected failures
    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Number of port calls made so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.drafts.write().await.clear();
        self.templates.write().await.clear();
        self.failures.write().await.clear();
    }

    async fn check(&self, operation: StoreOperation) -> Result<(), StoreError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        match self.failures.read().await.get(&operation) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn fetch_draft(&self, id: &DocumentId) -> Result<Document, StoreError> {
        self.check(StoreOperation::FetchDraft).await?;
        self.draft(id)
            .await
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn create_draft(&self, document: &Document) -> Result<Document, StoreError> {
        self.check(StoreOperation::CreateDraft).await?;
        let id = DocumentId::new();
        let created = document
            .clone()
            .with_id(id.clone())
            .with_kind(DocumentKind::Draft);
        self.drafts
            .write()
            .await
            .insert(id.as_str().to_string(), created.clone());
        Ok(created)
    }

    async fn save_draft(&self, id: &DocumentId, document: &Document) -> Result<Document, StoreError> {
        self.check(StoreOperation::SaveDraft).await?;
        let stored = document
            .clone()
            .with_id(id.clone())
            .with_kind(DocumentKind::Draft);
        self.drafts
            .write()
            .await
            .insert(id.as_str().to_string(), stored.clone());
        Ok(stored)
    }

    async fn delete_draft(&self, id: &DocumentId) -> Result<(), StoreError> {
        self.check(StoreOperation::DeleteDraft).await?;
        self.drafts
            .write()
            .await
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn list_drafts(&self) -> Result<Vec<Document>, StoreError> {
        self.check(StoreOperation::ListDrafts).await?;
        Ok(self.drafts.read().await.values().cloned().collect())
    }

    async fn create_template(&self, document: &Document) -> Result<Document, StoreError> {
        self.check(StoreOperation::CreateTemplate).await?;
        let created = document
            .clone()
            .with_id(DocumentId::new())
            .with_kind(DocumentKind::Template);
        if let Some(id) = created.id() {
            self.templates
                .write()
                .await
                .insert(id.as_str().to_string(), created.clone());
        }
        Ok(created)
    }

    async fn update_template(
        &self,
        id: &DocumentId,
        document: &Document,
    ) -> Result<Document, StoreError> {
        self.check(StoreOperation::UpdateTemplate).await?;
        let mut templates = self.templates.write().await;
        match templates.get_mut(id.as_str()) {
            Some(existing) => {
                *existing = document
                    .clone()
                    .with_id(id.clone())
                    .with_kind(DocumentKind::Template);
                Ok(existing.clone())
            }
            None => Err(StoreError::NotFound(id.clone())),
        }
    }

    async fn delete_template(&self, id: &DocumentId) -> Result<(), StoreError> {
        self.check(StoreOperation::DeleteTemplate).await?;
        self.templates
            .write()
            .await
            .remove(id.as_str())
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn list_templates(&self) -> Result<Vec<Document>, StoreError> {
        self.check(StoreOperation::ListTemplates).await?;
        Ok(self.templates.read().await.values().cloned().collect())
    }
}
