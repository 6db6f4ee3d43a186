//! TemplateLibrary - the template list and its local cache.
//!
//! The cached listing is what the mode resolver reads when a template is
//! reopened by index, so every change that reaches the store is mirrored
//! into the cache.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::document::{extract_template, parse_redaction_terms, Document};
use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};
use crate::i18n::{t, Locale};
use crate::ports::{CacheError, DocumentStore, Notice, Notifier, StoreError, TemplateCache};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Template store error: {0}")]
    Store(#[from] StoreError),

    #[error("Template cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("No template at index {index} (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Template has not been saved yet")]
    NotPersisted,
}

impl LibraryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LibraryError::Validation(_) => ErrorCode::ValidationFailed,
            LibraryError::Store(err) => err.code(),
            LibraryError::Cache(_) => ErrorCode::CacheError,
            LibraryError::IndexOutOfRange { .. } => ErrorCode::DocumentNotFound,
            LibraryError::NotPersisted => ErrorCode::NotPersisted,
        }
    }
}

pub struct TemplateLibrary {
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn TemplateCache>,
    notifier: Arc<dyn Notifier>,
    notice_duration: Duration,
    locale: Locale,
}

impl TemplateLibrary {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn TemplateCache>,
        notifier: Arc<dyn Notifier>,
        notice_duration: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            notifier,
            notice_duration,
            locale: Locale::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Lists templates from the store and caches the listing.
    ///
    /// A cache write failure is logged; the listing is still returned.
    pub async fn refresh(&self) -> Result<Vec<Document>, LibraryError> {
        let templates = match self.store.list_templates().await {
            Ok(templates) => templates,
            Err(err) => {
                let err = LibraryError::from(err);
                self.notify_failure("templates.loadError", &err);
                return Err(err);
            }
        };
        if let Err(err) = self.cache.set_templates(&templates).await {
            warn!(error = %err, "Could not cache template listing");
        }
        info!(count = templates.len(), "Template listing refreshed");
        Ok(templates)
    }

    /// The last cached listing.
    pub async fn cached(&self) -> Result<Vec<Document>, LibraryError> {
        Ok(self.cache.templates().await?)
    }

    /// Extracts a template from `document` and creates it in the store.
    ///
    /// `terms` is the comma-separated list typed by the user. Validation
    /// failures never reach the store.
    pub async fn save_extracted(
        &self,
        document: &Document,
        terms: &str,
        name: &str,
    ) -> Result<Document, LibraryError> {
        let terms = parse_redaction_terms(terms);
        let template = match extract_template(document, &terms, name) {
            Ok(template) => template,
            Err(err) => {
                let err = LibraryError::from(err);
                self.notify_failure("templates.saveError", &err);
                return Err(err);
            }
        };

        let created = match self.store.create_template(&template).await {
            Ok(created) => created,
            Err(err) => {
                warn!(error = %err, "Template creation failed");
                let err = LibraryError::from(err);
                self.notify_failure("templates.saveError", &err);
                return Err(err);
            }
        };

        let mut listing = self.cached_or_empty().await;
        listing.push(created.clone());
        self.write_cache(&listing).await;

        let title = created.resolved_title();
        info!(name = %title, redactions = terms.len(), "Template saved");
        self.notifier.notify(Notice::success(
            t(self.locale, "templates.saveSuccess", &[("name", &title)]),
            self.notice_duration,
        ));
        Ok(created)
    }

    /// Deletes the template at `index` of the cached listing.
    pub async fn delete(&self, index: usize) -> Result<Document, LibraryError> {
        let mut listing = self.cache.templates().await?;
        if index >= listing.len() {
            return Err(LibraryError::IndexOutOfRange {
                index,
                len: listing.len(),
            });
        }
        let Some(id) = listing[index].id().cloned() else {
            return Err(LibraryError::NotPersisted);
        };

        if let Err(err) = self.store.delete_template(&id).await {
            warn!(%id, error = %err, "Template deletion failed");
            let err = LibraryError::from(err);
            self.notify_failure("templates.deleteError", &err);
            return Err(err);
        }

        let removed = listing.remove(index);
        self.write_cache(&listing).await;
        info!(%id, "Template deleted");
        Ok(removed)
    }

    async fn cached_or_empty(&self) -> Vec<Document> {
        self.cache.templates().await.unwrap_or_else(|err| {
            warn!(error = %err, "Discarding unreadable template cache");
            Vec::new()
        })
    }

    async fn write_cache(&self, listing: &[Document]) {
        if let Err(err) = self.cache.set_templates(listing).await {
            warn!(error = %err, "Could not update template cache");
        }
    }

    fn notify_failure(&self, key: &str, err: &LibraryError) {
        let error = DomainError::new(err.code(), t(self.locale, key, &[]))
            .with_detail("reason", err.to_string());
        self.notifier
            .notify(Notice::failure(&error, self.notice_duration));
    }
}
