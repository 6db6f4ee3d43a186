//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the editing core and the outside world. Adapters implement these ports.
//!
//! - `DocumentStore` - Remote persistence of drafts and templates
//! - `TemplateCache` - Local key/value cache of the template listing
//! - `Clipboard` - Rich and plain-text clipboard writes
//! - `Notifier` - Transient user-facing notices
//! - `TextReviser` - AI rewrite endpoint

mod clipboard;
mod document_store;
mod notifier;
mod template_cache;
mod text_reviser;

pub use clipboard::{Clipboard, ClipboardError};
pub use document_store::{DocumentStore, StoreError};
pub use notifier::{Notice, NoticeKind, Notifier};
pub use template_cache::{CacheError, TemplateCache, TEMPLATE_CACHE_KEY};
pub use text_reviser::{ReviseError, TextReviser};
