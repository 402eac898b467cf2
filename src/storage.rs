//! Artifact storage boundary.
//!
//! The pipeline only needs "store bytes under a key, read bytes by key".
//! Keys may contain `/` separators; the filesystem store maps them to
//! subdirectories under its root.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

/// Key-value store for rendered artifacts
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Store bytes under a key, overwriting any previous value
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Read bytes by key; `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Filesystem-backed artifact store
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ArtifactStore for FsStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create artifact dir: {}", parent.display()))?;
        }
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write artifact: {}", path.display()))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to read artifact: {}", path.display()))
            }
        }
    }
}

/// In-memory artifact store, used by tests
#[derive(Default)]
pub struct MemStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for MemStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries.read().await.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        let bytes = b"\x89PNG fake image bytes";
        store.put("run-1/round_1.png", bytes).await.unwrap();

        let read = store.get("run-1/round_1.png").await.unwrap();
        assert_eq!(read.as_deref(), Some(bytes.as_slice()));
    }

    #[tokio::test]
    async fn test_fs_store_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        assert!(store.get("absent.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mem_store_round_trip() {
        let store = MemStore::new();
        store.put("k", b"v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));
        assert!(store.get("missing").await.unwrap().is_none());
    }
}
