//! In-Memory Clipboard Adapter
//!
//! Records the last write and can be told to reject rich or plain writes.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::ports::{Clipboard, ClipboardError};

/// What the clipboard currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardContent {
    Rich { html: String, plain_text: String },
    Text(String),
}

#[derive(Debug, Default)]
struct State {
    content: Option<ClipboardContent>,
    fail_rich: bool,
    fail_text: bool,
}

/// Test clipboard with failure injection
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    state: Arc<Mutex<State>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject rich (HTML) writes
    pub fn with_rich_failure(self) -> Self {
        self.lock().fail_rich = true;
        self
    }

    /// Reject plain-text writes
    pub fn with_text_failure(self) -> Self {
        self.lock().fail_text = true;
        self
    }

    /// Last successful write
    pub fn content(&self) -> Option<ClipboardContent> {
        self.lock().content.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked mid-write; the data is still usable.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_rich(&self, html: &str, plain_text: &str) -> Result<(), ClipboardError> {
        let mut state = self.lock();
        if state.fail_rich {
            return Err(ClipboardError::Rejected("rich content not supported".to_string()));
        }
        state.content = Some(ClipboardContent::Rich {
            html: html.to_string(),
            plain_text: plain_text.to_string(),
        });
        Ok(())
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut state = self.lock();
        if state.fail_text {
            return Err(ClipboardError::Unavailable("no clipboard".to_string()));
        }
        state.content = Some(ClipboardContent::Text(text.to_string()));
        Ok(())
    }
}
