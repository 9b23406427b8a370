//! Key-value storage seam.
//!
//! The preference store persists one JSON blob under one key, so the trait
//! only needs string get/set/remove. [`MemoryStore`] backs tests and
//! ephemeral sessions; [`FileStore`] keeps one file per key in a directory.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::StoreError;

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if it was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Process-lifetime storage backed by a `HashMap`.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// Directory-backed storage: each key is a `<key>.json` file.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// reader never observes a half-written value.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn memory_store_get_set_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "v1".into()).await.unwrap();
        store.set("k", "v2".into()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);

        store.remove("k").await.unwrap();
        store.remove("k").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::new(dir.path().join("nested"));
        assert_eq!(store.get("prefs").await.unwrap(), None);
        store.set("prefs", "{\"a\":1}".into()).await.unwrap();

        let reopened = FileStore::new(dir.path().join("nested"));
        assert_eq!(
            reopened.get("prefs").await.unwrap().as_deref(),
            Some("{\"a\":1}")
        );

        reopened.remove("prefs").await.unwrap();
        reopened.remove("prefs").await.unwrap();
        assert_eq!(store.get("prefs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_matches!(
            store.set("../escape", "x".into()).await,
            Err(StoreError::InvalidKey(_))
        );
        assert_matches!(store.get("").await, Err(StoreError::InvalidKey(_)));
        assert_matches!(store.get(".hidden").await, Err(StoreError::InvalidKey(_)));
    }
}
