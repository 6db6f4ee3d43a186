//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the editing core to external systems:
//! - `rest` - Document store and text reviser over the backend's REST API
//! - `storage` - File-backed template cache
//! - `system` - OS clipboard and log-based notices
//! - `memory` - In-memory implementations for tests and offline use

pub mod memory;
pub mod rest;
pub mod storage;
pub mod system;

pub use memory::{InMemoryDocumentStore, InMemoryTemplateCache, MemoryClipboard, RecordingNotifier};
pub use rest::{HttpDocumentStore, HttpTextReviser};
pub use storage::FileTemplateCache;
pub use system::{SystemClipboard, TracingNotifier};
