//! In-memory adapters for tests and offline use.

mod clipboard;
mod document_store;
mod notifier;
mod template_cache;
mod text_reviser;

pub use clipboard::{ClipboardContent, MemoryClipboard};
pub use document_store::{InMemoryDocumentStore, StoreOperation};
pub use notifier::RecordingNotifier;
pub use template_cache::InMemoryTemplateCache;
pub use text_reviser::{MockTextReviser, ReviseCall};
