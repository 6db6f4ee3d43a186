//! Clipboard Port - Interface for writing exported content.

use async_trait::async_trait;

/// Errors that can occur while writing to the clipboard
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Clipboard rejected the write: {0}")]
    Rejected(String),
}

/// Port for a system or in-memory clipboard
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Write HTML with a plain-text alternative
    async fn write_rich(&self, html: &str, plain_text: &str) -> Result<(), ClipboardError>;

    /// Write plain text only
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}
