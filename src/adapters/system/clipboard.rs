//! System Clipboard Adapter backed by `arboard`.
//!
//! `arboard::Clipboard` is not `Send` on every platform, so each write opens
//! a fresh handle on a blocking thread.

use arboard::Clipboard as Board;
use async_trait::async_trait;
use tokio::task;

use crate::ports::{Clipboard, ClipboardError};

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl SystemClipboard {
    pub fn new() -> Self {
        Self
    }

    async fn with_board<F>(write: F) -> Result<(), ClipboardError>
    where
        F: FnOnce(&mut Board) -> Result<(), arboard::Error> + Send + 'static,
    {
        task::spawn_blocking(move || {
            let mut board = Board::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            write(&mut board).map_err(|e| match e {
                arboard::Error::ClipboardNotSupported => ClipboardError::Unavailable(e.to_string()),
                other => ClipboardError::Rejected(other.to_string()),
            })
        })
        .await
        .map_err(|e| ClipboardError::Unavailable(e.to_string()))?
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_rich(&self, html: &str, plain_text: &str) -> Result<(), ClipboardError> {
        let html = html.to_string();
        let plain_text = plain_text.to_string();
        Self::with_board(move |board| board.set_html(html, Some(plain_text))).await
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        Self::with_board(move |board| board.set_text(text)).await
    }
}
