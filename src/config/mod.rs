//! Application configuration module
//!
//! Configuration is loaded from environment variables using the `config` and
//! `dotenvy` crates, with the `DRAFT_DESK` prefix and `__` between nested
//! values. Every section has defaults, so an empty environment yields a
//! usable local setup.
//!
//! # Example
//!
//! ```no_run
//! use draft_desk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Store endpoint: {}", config.store.endpoint());
//! ```

mod cache;
mod editor;
mod error;
mod logging;
mod reviser;
mod store;

pub use cache::CacheConfig;
pub use editor::{EditorConfig, MAX_HISTORY_LIMIT};
pub use error::{ConfigError, ValidationError};
pub use logging::{init_tracing, LoggingConfig};
pub use reviser::ReviserConfig;
pub use store::StoreConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Document store (REST backend)
    #[serde(default)]
    pub store: StoreConfig,

    /// AI revision endpoint
    #[serde(default)]
    pub reviser: ReviserConfig,

    /// Editor behaviour (history, notices, locale)
    #[serde(default)]
    pub editor: EditorConfig,

    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Local template cache
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DRAFT_DESK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `DRAFT_DESK__STORE__BASE_URL=https://...` -> `store.base_url`
    /// - `DRAFT_DESK__EDITOR__HISTORY_LIMIT=50` -> `editor.history_limit = 50`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DRAFT_DESK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.store.validate()?;
        self.reviser.validate()?;
        self.editor.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Endpoint the text reviser posts to
    pub fn reviser_endpoint(&self) -> String {
        match &self.reviser.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.store.endpoint(),
        }
    }
}
