//! In-Memory Template Cache Adapter

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{CacheError, TemplateCache};

/// Process-local key/value cache
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateCache {
    entries: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl InMemoryTemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all entries
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl TemplateCache for InMemoryTemplateCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), CacheError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}
