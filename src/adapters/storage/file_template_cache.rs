//! File-based Template Cache Adapter
//!
//! Keeps all cache entries in one JSON object on disk, keyed like the
//! browser's local storage.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::ports::{CacheError, TemplateCache};

/// JSON file backed key/value cache
#[derive(Debug, Clone)]
pub struct FileTemplateCache {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Arc<Mutex<()>>,
}

impl FileTemplateCache {
    /// Create a cache stored at `path`
    ///
    /// The file and its parent directories are created on first write.
    ///
    /// # Example
    /// ```ignore
    /// let cache = FileTemplateCache::new("./data/cache.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Map<String, Value>, CacheError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(CacheError::Io(e.to_string())),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(CacheError::Corrupt("cache file is not a JSON object".to_string())),
            Err(e) => Err(CacheError::Corrupt(e.to_string())),
        }
    }

    async fn ensure_parent(&self) -> Result<(), CacheError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
                .await
                .map_err(|e| CacheError::Io(e.to_string())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl TemplateCache for FileTemplateCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value);

        let json = serde_json::to_string_pretty(&Value::Object(entries))
            .map_err(|e| CacheError::Corrupt(e.to_string()))?;
        self.ensure_parent().await?;
        fs::write(&self.path, json)
            .await
            .map_err(|e| CacheError::Io(e.to_string()))?;

        debug!(key, path = %self.path.display(), "Cache entry written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{Document, DocumentType};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileTemplateCache::new(temp_dir.path().join("cache.json"));

        assert_eq!(cache.get("anything").await.unwrap(), None);
        assert!(cache.templates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_creates_directories_and_keeps_other_keys() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileTemplateCache::new(temp_dir.path().join("nested/dir/cache.json"));

        cache.set("other", json!(1)).await.unwrap();
        let template = Document::blank_template(DocumentType::ScheduleChange).with_content("<p>Moved</p>");
        cache.set_templates(&[template.clone()]).await.unwrap();

        let reopened = FileTemplateCache::new(cache.path());
        assert_eq!(reopened.get("other").await.unwrap(), Some(json!(1)));
        assert_eq!(reopened.templates().await.unwrap(), vec![template]);
    }

    #[tokio::test]
    async fn test_garbage_file_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        fs::write(&path, "[1, 2").await.unwrap();

        let cache = FileTemplateCache::new(&path);
        assert!(matches!(cache.get("x").await, Err(CacheError::Corrupt(_))));
    }
}
