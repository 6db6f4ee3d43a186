//! Mock Text Reviser for testing.
//!
//! Returns queued responses in order and records every call. With nothing
//! queued the content comes back unchanged.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{ReviseError, TextReviser};

/// A recorded revision request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviseCall {
    pub content: String,
    pub instruction: String,
}

#[derive(Debug, Clone, Default)]
pub struct MockTextReviser {
    responses: Arc<Mutex<VecDeque<Result<String, ReviseError>>>>,
    calls: Arc<Mutex<Vec<ReviseCall>>>,
    delay: Duration,
}

impl MockTextReviser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(Ok(content.into()));
        self
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: ReviseError) -> Self {
        self.push(Err(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<ReviseCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(&self, response: Result<String, ReviseError>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }
}

#[async_trait]
impl TextReviser for MockTextReviser {
    async fn revise(&self, content: &str, instruction: &str) -> Result<String, ReviseError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(ReviseCall {
                content: content.to_string(),
                instruction: instruction.to_string(),
            });
        }

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = self.responses.lock().ok().and_then(|mut r| r.pop_front());
        next.unwrap_or_else(|| Ok(content.to_string()))
    }
}
