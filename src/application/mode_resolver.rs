//! ModeResolver - decides where a session's content comes from.
//!
//! Navigation state can be lost, e.g. on reload. The resolver degrades in a
//! fixed order so that a lost payload ends in a recovered template, a fresh
//! draft or a redirect, never in a broken editor:
//!
//! 1. a template payload carried by the navigation
//! 2. a template index looked up in the local cache
//! 3. template route without either: back to the template list
//! 4. otherwise the draft id from the route

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::document::{Document, DocumentKind};
use crate::domain::foundation::DocumentId;
use crate::ports::TemplateCache;

use super::editor_session::{EditorSession, SessionError, SessionIdentity};

/// The editor route that was navigated to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/editor/:id`
    DraftEdit(DocumentId),
    /// The template editing route; carries no id of its own.
    TemplateEdit,
}

/// Transient state handed over by the navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationContext {
    pub route: Route,
    pub template: Option<Document>,
    pub template_index: Option<usize>,
}

impl NavigationContext {
    pub fn draft(id: DocumentId) -> Self {
        Self {
            route: Route::DraftEdit(id),
            template: None,
            template_index: None,
        }
    }

    /// Template edit route carrying the full payload.
    pub fn template(template: Document, index: Option<usize>) -> Self {
        Self {
            route: Route::TemplateEdit,
            template: Some(template),
            template_index: index,
        }
    }

    /// Template edit route after the payload was lost.
    pub fn template_index(index: usize) -> Self {
        Self {
            route: Route::TemplateEdit,
            template: None,
            template_index: Some(index),
        }
    }
}

/// Where the resolver sends the user when nothing can be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    TemplateList,
}

/// Outcome of resolving a navigation context.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Template(Document),
    Draft(DocumentId),
    Redirect(RedirectTarget),
}

impl Resolution {
    /// Session identity to bind, if any.
    pub fn identity(&self) -> Option<SessionIdentity> {
        match self {
            Resolution::Template(document) => Some(SessionIdentity::Template(document.clone())),
            Resolution::Draft(id) => Some(SessionIdentity::Draft(id.clone())),
            Resolution::Redirect(_) => None,
        }
    }
}

/// Resolves navigation contexts against the template cache.
pub struct ModeResolver {
    cache: Arc<dyn TemplateCache>,
}

impl ModeResolver {
    pub fn new(cache: Arc<dyn TemplateCache>) -> Self {
        Self { cache }
    }

    /// Applies the fallback order. Never touches the network.
    pub async fn resolve(&self, context: &NavigationContext) -> Resolution {
        if let Some(template) = &context.template {
            debug!("Using template payload from navigation");
            return Resolution::Template(template.clone().with_kind(DocumentKind::Template));
        }

        if let Some(index) = context.template_index {
            match self.cache.templates().await {
                Ok(templates) => match templates.into_iter().nth(index) {
                    Some(template) => {
                        debug!(index, "Recovered template from cache");
                        return Resolution::Template(template);
                    }
                    None => debug!(index, "Template index not in cache"),
                },
                Err(err) => warn!(index, error = %err, "Template cache unreadable"),
            }
        }

        match &context.route {
            Route::TemplateEdit => {
                warn!("Template editor opened without a template, redirecting");
                Resolution::Redirect(RedirectTarget::TemplateList)
            }
            Route::DraftEdit(id) => Resolution::Draft(id.clone()),
        }
    }
}

/// Resolves `context` and binds `session` to the result.
///
/// A redirect leaves the session untouched.
pub async fn open_session(
    resolver: &ModeResolver,
    session: &EditorSession,
    context: &NavigationContext,
) -> Result<Resolution, SessionError> {
    let resolution = resolver.resolve(context).await;
    if let Some(identity) = resolution.identity() {
        session.bind(identity).await?;
    }
    Ok(resolution)
}
