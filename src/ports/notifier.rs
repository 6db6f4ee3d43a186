//! Notifier Port - Transient user-facing notices.
//!
//! Failures of user actions never surface as errors from the session API
//! alone; they are also announced here so a UI can show a toast.

use std::time::Duration;

use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// A message shown for `duration` and then dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub code: Option<ErrorCode>,
    pub duration: Duration,
}

impl Notice {
    pub fn success(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
            code: None,
            duration,
        }
    }

    pub fn failure(error: &DomainError, duration: Duration) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: error.message.clone(),
            code: Some(error.code),
            duration,
        }
    }
}

/// Port for announcing outcomes to the user
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}
