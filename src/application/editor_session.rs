//! EditorSession - owns the live editing surface bound to one document.
//!
//! ```text
//! bind(identity)   any state -> Loading -> Ready
//! change_locale    Ready -> Loading -> Ready (surface rebuilt, content kept)
//! save             Ready -> Saving -> Ready
//! close / delete   any state -> Destroyed
//! ```
//!
//! Session state sits behind a `tokio::sync::Mutex` that is never held
//! across a network await, so the surface stays editable while a save is in
//! flight. Every bind starts a new epoch and fires the previous binding's
//! cancellation token; results that arrive for an older epoch are dropped.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::EditorConfig;
use crate::domain::document::{display_label, Document, DocumentKind, DocumentType};
use crate::domain::foundation::{
    DocumentId, DomainError, ErrorCode, SessionState, StateMachine, Timestamp, ValidationError,
    TRANSITION_FIELD,
};
use crate::domain::richtext::{RichTextEditor, DEFAULT_HISTORY_LIMIT};
use crate::i18n::{t, translator, Locale};
use crate::ports::{
    DocumentStore, Notice, Notifier, ReviseError, StoreError, TemplateCache, TextReviser,
};

const PLACEHOLDER_KEY: &str = "draftEditor.placeholder";

/// What a session is bound to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionIdentity {
    /// A persisted draft, fetched from the store.
    Draft(DocumentId),
    /// A draft that exists only locally until its first save creates it.
    NewDraft(Document),
    /// A template payload supplied directly, persisted or not.
    Template(Document),
}

/// Result of a save that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The store accepted the document.
    Saved(Document),
    /// The session was rebound or closed while the request was in flight.
    Discarded,
}

/// Errors returned by session operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("A save is already in progress")]
    AlreadySaving,

    #[error("Session is not ready (state: {0})")]
    NotReady(SessionState),

    #[error("Session has been destroyed")]
    Destroyed,

    #[error("Save failed: {0}")]
    SaveFailed(StoreError),

    #[error("Delete failed: {0}")]
    DeleteFailed(StoreError),

    #[error("Document has not been saved yet")]
    NotPersisted,

    #[error("Revision failed: {0}")]
    ReviseFailed(ReviseError),

    #[error("Session was rebound before the request completed")]
    Superseded,

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SessionError {
    /// Error code reported to the user.
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::AlreadySaving => ErrorCode::AlreadySaving,
            SessionError::NotReady(_) | SessionError::Superseded => {
                ErrorCode::InvalidStateTransition
            }
            SessionError::Destroyed => ErrorCode::SessionDestroyed,
            SessionError::SaveFailed(err) | SessionError::DeleteFailed(err) => err.code(),
            SessionError::NotPersisted => ErrorCode::NotPersisted,
            SessionError::ReviseFailed(_) => ErrorCode::RevisionFailed,
            SessionError::Validation(err) if err.field() == TRANSITION_FIELD => {
                ErrorCode::InvalidStateTransition
            }
            SessionError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}

impl From<SessionError> for DomainError {
    fn from(err: SessionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

/// Per-session settings taken from the `editor` configuration section.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub history_limit: usize,
    pub notice_duration: Duration,
    pub locale: Locale,
}

impl SessionSettings {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            history_limit: config.history_limit,
            notice_duration: config.notice_duration(),
            locale: config.locale(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            notice_duration: Duration::from_millis(2000),
            locale: Locale::default(),
        }
    }
}

/// The bound document together with its editable surface.
struct Surface {
    document: Document,
    editor: RichTextEditor,
}

struct Inner {
    state: SessionState,
    epoch: u64,
    locale: Locale,
    surface: Option<Surface>,
    cancel: watch::Sender<bool>,
}

impl Inner {
    fn transition(&mut self, target: SessionState) -> Result<(), SessionError> {
        self.state = self.state.transition_to(target)?;
        Ok(())
    }

    /// Drops the surface, fires the current cancellation token and starts
    /// a new epoch.
    fn teardown(&mut self) -> u64 {
        self.cancel.send_replace(true);
        let (cancel, _) = watch::channel(false);
        self.cancel = cancel;
        self.surface = None;
        self.epoch += 1;
        self.epoch
    }

    fn unavailable(&self) -> SessionError {
        match self.state {
            SessionState::Destroyed => SessionError::Destroyed,
            other => SessionError::NotReady(other),
        }
    }
}

/// Editor session controller.
pub struct EditorSession {
    store: Arc<dyn DocumentStore>,
    reviser: Arc<dyn TextReviser>,
    notifier: Arc<dyn Notifier>,
    template_cache: Option<Arc<dyn TemplateCache>>,
    settings: SessionSettings,
    inner: Mutex<Inner>,
}

impl EditorSession {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        reviser: Arc<dyn TextReviser>,
        notifier: Arc<dyn Notifier>,
        settings: SessionSettings,
    ) -> Self {
        let (cancel, _) = watch::channel(false);
        let locale = settings.locale;
        Self {
            store,
            reviser,
            notifier,
            template_cache: None,
            settings,
            inner: Mutex::new(Inner {
                state: SessionState::Uninitialized,
                epoch: 0,
                locale,
                surface: None,
                cancel,
            }),
        }
    }

    /// Mirrors saved templates into the local template listing, so the
    /// resolver can reopen them by index without a refresh.
    pub fn with_template_cache(mut self, cache: Arc<dyn TemplateCache>) -> Self {
        self.template_cache = Some(cache);
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Binds the session to a new identity.
    ///
    /// The previous surface is discarded before loading starts. A draft that
    /// cannot be fetched is replaced by an empty draft of the default
    /// category carrying the requested id.
    ///
    /// # Errors
    ///
    /// `SessionError::Superseded` if another bind or a close happened while
    /// the draft was being fetched.
    pub async fn bind(&self, identity: SessionIdentity) -> Result<(), SessionError> {
        let (epoch, mut cancelled) = {
            let mut inner = self.inner.lock().await;
            inner.transition(SessionState::Loading)?;
            let epoch = inner.teardown();
            (epoch, inner.cancel.subscribe())
        };
        debug!(epoch, "Binding session");

        let document = match identity {
            SessionIdentity::Template(document) => document,
            SessionIdentity::NewDraft(document) => document.with_kind(DocumentKind::Draft),
            SessionIdentity::Draft(id) => {
                let fetched = tokio::select! {
                    fetched = self.store.fetch_draft(&id) => Some(fetched),
                    _ = cancelled.changed() => None,
                };
                match fetched {
                    Some(Ok(document)) => {
                        let document = if document.is_persisted() {
                            document
                        } else {
                            document.with_id(id)
                        };
                        document.with_kind(DocumentKind::Draft)
                    }
                    Some(Err(err)) => {
                        warn!(%id, error = %err, "Draft could not be loaded, starting empty");
                        Document::draft(id, DocumentType::default())
                    }
                    None => {
                        debug!(epoch, "Bind cancelled");
                        return Err(SessionError::Superseded);
                    }
                }
            }
        };

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            return Err(SessionError::Superseded);
        }
        let mut editor = RichTextEditor::new(
            t(inner.locale, PLACEHOLDER_KEY, &[]),
            self.settings.history_limit,
        );
        editor.set_content(document.content());
        info!(
            epoch,
            kind = ?document.kind(),
            id = document.id().map(DocumentId::as_str).unwrap_or("-"),
            "Session ready"
        );
        inner.surface = Some(Surface { document, editor });
        inner.transition(SessionState::Ready)
    }

    /// Switches the display language.
    ///
    /// The surface is rebuilt so the placeholder is re-translated; content
    /// and document are kept. Undo history does not survive the rebuild.
    pub async fn change_locale(&self, locale: Locale) -> Result<(), SessionError> {
        let mut inner = self.inner.lock().await;
        if inner.locale == locale {
            return Ok(());
        }
        inner.locale = locale;
        let state = inner.state;
        let Some(surface) = inner.surface.as_mut() else {
            return Ok(());
        };
        surface.editor = surface.editor.rebuild(t(locale, PLACEHOLDER_KEY, &[]));
        debug!(%locale, "Surface rebuilt for locale change");

        // A save in flight keeps its state; only the surface is swapped.
        if state == SessionState::Ready {
            inner.transition(SessionState::Loading)?;
            inner.transition(SessionState::Ready)?;
        }
        Ok(())
    }

    /// Destroys the surface. Closing twice is a no-op.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Destroyed {
            return;
        }
        if inner.transition(SessionState::Destroyed).is_ok() {
            let epoch = inner.teardown();
            debug!(epoch, "Session closed");
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Runs a mutation against the live editor.
    ///
    /// Allowed while `Ready` and while a save is in flight.
    pub async fn edit<R>(&self, f: impl FnOnce(&mut RichTextEditor) -> R) -> Result<R, SessionError> {
        let mut inner = self.inner.lock().await;
        if !inner.state.is_editable() {
            return Err(inner.unavailable());
        }
        let state = inner.state;
        let surface = inner.surface.as_mut().ok_or(SessionError::NotReady(state))?;
        Ok(f(&mut surface.editor))
    }

    /// Reads from the live editor without mutating it.
    pub async fn view<R>(&self, f: impl FnOnce(&RichTextEditor) -> R) -> Option<R> {
        let inner = self.inner.lock().await;
        inner.surface.as_ref().map(|surface| f(&surface.editor))
    }

    /// The bound document with its live content.
    pub async fn snapshot(&self) -> Option<Document> {
        let inner = self.inner.lock().await;
        inner.surface.as_ref().map(|surface| {
            let mut document = surface.document.clone();
            document.set_content(surface.editor.get_content());
            document
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Persistence
    // ─────────────────────────────────────────────────────────────────────────

    /// Sends the full document to the store.
    ///
    /// Persisted documents go through `save_draft` or `update_template`,
    /// unsaved ones through `create_draft` or `create_template`. The copy the
    /// store returns becomes the bound document; the editor content is left
    /// as it is. The session returns to `Ready` whatever the outcome.
    pub async fn save(&self) -> Result<SaveOutcome, SessionError> {
        let (epoch, document) = {
            let mut inner = self.inner.lock().await;
            match inner.state {
                SessionState::Saving => return Err(SessionError::AlreadySaving),
                SessionState::Ready => {}
                _ => return Err(inner.unavailable()),
            }
            let surface = inner
                .surface
                .as_ref()
                .ok_or(SessionError::NotReady(SessionState::Ready))?;
            let document = surface
                .document
                .prepared_for_save(surface.editor.get_content(), Timestamp::now());
            inner.transition(SessionState::Saving)?;
            (inner.epoch, document)
        };

        let result = self.persist(&document).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!(epoch, "Discarding save result of a previous binding");
            return Ok(SaveOutcome::Discarded);
        }
        if inner.state == SessionState::Saving {
            inner.transition(SessionState::Ready)?;
        }
        let locale = inner.locale;

        match result {
            Ok(saved) => {
                if let Some(surface) = inner.surface.as_mut() {
                    surface.document = saved.clone();
                }
                drop(inner);
                info!(epoch, "Document saved");
                self.notify_success(locale, "draftEditor.saveSuccess");
                Ok(SaveOutcome::Saved(saved))
            }
            Err(err) => {
                drop(inner);
                warn!(epoch, error = %err, "Save failed");
                self.notify_failure(locale, "draftEditor.saveError", &err);
                Err(err)
            }
        }
    }

    async fn persist(&self, document: &Document) -> Result<Document, SessionError> {
        let saved = match (document.kind(), document.id()) {
            (DocumentKind::Draft, Some(id)) => self.store.save_draft(id, document).await,
            (DocumentKind::Draft, None) => self.store.create_draft(document).await,
            (DocumentKind::Template, Some(id)) => self.store.update_template(id, document).await,
            (DocumentKind::Template, None) => self.store.create_template(document).await,
        }
        .map_err(SessionError::SaveFailed)?;

        if saved.is_template() {
            if let Some(cache) = &self.template_cache {
                if let Err(err) = cache.upsert_template(&saved).await {
                    warn!(error = %err, "Could not update template cache");
                }
            }
        }
        Ok(saved)
    }

    /// Deletes the bound draft or template, then destroys the session.
    ///
    /// On failure the session keeps its state and content.
    pub async fn delete(&self) -> Result<(), SessionError> {
        let (epoch, document, locale) = {
            let inner = self.inner.lock().await;
            match inner.state {
                SessionState::Ready => {}
                SessionState::Saving => return Err(SessionError::AlreadySaving),
                _ => return Err(inner.unavailable()),
            }
            let document = inner
                .surface
                .as_ref()
                .map(|surface| surface.document.clone())
                .ok_or(SessionError::NotReady(SessionState::Ready))?;
            (inner.epoch, document, inner.locale)
        };

        let Some(id) = document.id() else {
            let err = SessionError::NotPersisted;
            self.notify_failure(locale, "draftEditor.deleteError", &err);
            return Err(err);
        };

        let result = if document.is_template() {
            self.store.delete_template(id).await
        } else {
            self.store.delete_draft(id).await
        };

        match result {
            Ok(()) => {
                let mut inner = self.inner.lock().await;
                if inner.epoch == epoch && inner.transition(SessionState::Destroyed).is_ok() {
                    inner.teardown();
                }
                drop(inner);
                info!(%id, "Document deleted");
                self.notify_success(locale, "draftEditor.deleteSuccess");
                Ok(())
            }
            Err(err) => {
                warn!(%id, error = %err, "Delete failed");
                let err = SessionError::DeleteFailed(err);
                self.notify_failure(locale, "draftEditor.deleteError", &err);
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // AI revision
    // ─────────────────────────────────────────────────────────────────────────

    /// Rewrites the content following `instruction` and applies the result
    /// as one undoable step.
    pub async fn revise(&self, instruction: &str) -> Result<(), SessionError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ValidationError::empty_field("instruction").into());
        }

        let (epoch, content) = {
            let inner = self.inner.lock().await;
            if !inner.state.is_editable() {
                return Err(inner.unavailable());
            }
            let content = inner
                .surface
                .as_ref()
                .map(|surface| surface.editor.get_content())
                .ok_or(SessionError::NotReady(inner.state))?;
            (inner.epoch, content)
        };

        let result = self.reviser.revise(&content, instruction).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            return Err(SessionError::Superseded);
        }
        let locale = inner.locale;
        let applied = match (result, inner.surface.as_mut()) {
            (Ok(revised), Some(surface)) => surface
                .editor
                .replace_content(&revised)
                .map_err(|e| SessionError::ReviseFailed(ReviseError::InvalidContent(e.to_string()))),
            (Ok(_), None) => Err(SessionError::Superseded),
            (Err(err), _) => Err(SessionError::ReviseFailed(err)),
        };
        drop(inner);

        match applied {
            Ok(()) => {
                self.notify_success(locale, "draftEditor.reviseSuccess");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Revision not applied");
                self.notify_failure(locale, "draftEditor.reviseError", &err);
                Err(err)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    pub async fn epoch(&self) -> u64 {
        self.inner.lock().await.epoch
    }

    pub async fn locale(&self) -> Locale {
        self.inner.lock().await.locale
    }

    /// Cancellation token of the current binding; flips to `true` when the
    /// session is rebound or closed.
    pub async fn cancellation(&self) -> watch::Receiver<bool> {
        self.inner.lock().await.cancel.subscribe()
    }

    /// Placeholder shown while the surface is empty.
    pub async fn placeholder(&self) -> Option<String> {
        self.view(|editor| editor.placeholder().to_string()).await
    }

    /// Heading for the bound document in the current locale.
    pub async fn label(&self) -> Option<String> {
        let inner = self.inner.lock().await;
        let t = translator(inner.locale);
        inner
            .surface
            .as_ref()
            .map(|surface| display_label(&surface.document, t))
    }

    fn notify_success(&self, locale: Locale, key: &str) {
        self.notifier.notify(Notice::success(
            t(locale, key, &[]),
            self.settings.notice_duration,
        ));
    }

    fn notify_failure(&self, locale: Locale, key: &str, err: &SessionError) {
        let error = DomainError::new(err.code(), t(locale, key, &[]))
            .with_detail("reason", err.to_string());
        self.notifier
            .notify(Notice::failure(&error, self.settings.notice_duration));
    }
}
