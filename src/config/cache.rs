//! Template cache configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Template cache configuration
///
/// Without a path the cache lives in memory for the lifetime of the process.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
    /// JSON file backing the cache
    pub path: Option<PathBuf>,
}

impl CacheConfig {
    pub fn is_persistent(&self) -> bool {
        self.path.is_some()
    }
}
