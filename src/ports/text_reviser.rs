//! Text Reviser Port - AI-assisted rewriting of document content.

use async_trait::async_trait;

/// Errors that can occur during a revision request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviseError {
    #[error("Revision request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Reviser responded with {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Failed to decode revision: {0}")]
    Decode(String),

    #[error("Revised content is not valid rich text: {0}")]
    InvalidContent(String),
}

/// Port for the generation backend's rewrite endpoint
#[async_trait]
pub trait TextReviser: Send + Sync {
    /// Rewrite `content` following `instruction`
    ///
    /// # Returns
    /// The revised content as rich-text HTML
    async fn revise(&self, content: &str, instruction: &str) -> Result<String, ReviseError>;
}
