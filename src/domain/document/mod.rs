//! Document module - drafts, templates and template extraction.

mod aggregate;
mod extraction;
mod title;

pub use aggregate::{Document, DocumentKind, DocumentType};
pub use extraction::{extract_template, parse_redaction_terms, redact, PLACEHOLDER_TOKEN};
pub use title::{derive_title, display_label, UNTITLED_TEMPLATE};
