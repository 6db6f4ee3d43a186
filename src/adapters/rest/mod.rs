//! REST adapters for the document backend.

mod document_store;
mod text_reviser;

pub use document_store::{HttpDocumentStore, HttpStoreConfig};
pub use text_reviser::{HttpReviserConfig, HttpTextReviser};
