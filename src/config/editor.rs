//! Editor behaviour configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::i18n::{Locale, SUPPORTED_LOCALES};

/// Upper bound for the undo history.
pub const MAX_HISTORY_LIMIT: usize = 10_000;

/// Editor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    /// Number of undo steps kept per session
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// How long notices stay visible, in milliseconds
    #[serde(default = "default_notice_duration")]
    pub notice_duration_ms: u64,

    /// Locale used for placeholder and notice texts
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl EditorConfig {
    pub fn notice_duration(&self) -> Duration {
        Duration::from_millis(self.notice_duration_ms)
    }

    /// Configured locale, falling back to English when unsupported
    pub fn locale(&self) -> Locale {
        Locale::parse(&self.locale).unwrap_or_default()
    }

    /// Validate editor configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_limit == 0 || self.history_limit > MAX_HISTORY_LIMIT {
            return Err(ValidationError::InvalidHistoryLimit {
                max: MAX_HISTORY_LIMIT,
            });
        }
        if self.notice_duration_ms == 0 {
            return Err(ValidationError::InvalidNoticeDuration);
        }
        if Locale::parse(&self.locale).is_none() {
            return Err(ValidationError::UnsupportedLocale(self.locale.clone()));
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            notice_duration_ms: default_notice_duration(),
            locale: default_locale(),
        }
    }
}

fn default_history_limit() -> usize {
    crate::domain::richtext::DEFAULT_HISTORY_LIMIT
}

fn default_notice_duration() -> u64 {
    2000
}

fn default_locale() -> String {
    SUPPORTED_LOCALES[0].to_string()
}
