//! Application layer - editing workflows over the ports.
//!
//! - `EditorSession` - binds one document to an editing surface and saves it
//! - `ModeResolver` - picks template payload, cached template or draft
//! - `ClipboardExporter` - rich copy with plain-text fallback
//! - `TemplateLibrary` - template listing, extraction and deletion

pub mod clipboard_export;
pub mod editor_session;
pub mod mode_resolver;
pub mod template_library;

pub use clipboard_export::{export_rich, flatten_html, ClipboardExporter, CopyError, CopyOutcome, RichExport};
pub use editor_session::{
    EditorSession, SaveOutcome, SessionError, SessionIdentity, SessionSettings,
};
pub use mode_resolver::{
    open_session, ModeResolver, NavigationContext, RedirectTarget, Resolution, Route,
};
pub use template_library::{LibraryError, TemplateLibrary};
