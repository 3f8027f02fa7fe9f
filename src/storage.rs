use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

/// Blob sink for uploaded media, addressed by the derived filename.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
}

/// Writes blobs into a directory on the local filesystem.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        if !root.is_dir() {
            warn!(dir = %root.display(), "upload directory does not exist; uploads will fail until it is created");
        }
        Self { root }
    }

    fn path_for(&self, key: &str) -> anyhow::Result<PathBuf> {
        // keys are already sanitised, this only guards against misuse
        anyhow::ensure!(
            !key.is_empty() && !key.contains(['/', '\\']) && key != "." && key != "..",
            "invalid storage key {:?}",
            key
        );
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl StorageClient for LocalStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        debug!(%key, %content_type, size = body.len(), "object stored");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("remove {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("bubbles-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn put_then_delete_object() {
        let dir = scratch_dir("put-delete");
        let storage = LocalStorage::new(&dir);

        storage
            .put_object("1.5_cat.png", Bytes::from_static(b"png"), "image/png")
            .await
            .unwrap();
        assert_eq!(std::fs::read(dir.join("1.5_cat.png")).unwrap(), b"png");

        storage.delete_object("1.5_cat.png").await.unwrap();
        assert!(!dir.join("1.5_cat.png").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn rejects_keys_with_separators() {
        let dir = scratch_dir("reject");
        let storage = LocalStorage::new(&dir);
        let err = storage
            .put_object("../escape.png", Bytes::from_static(b"x"), "image/png")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid storage key"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn write_into_missing_directory_fails() {
        let storage = LocalStorage::new(std::env::temp_dir().join("bubbles-does-not-exist-dir"));
        assert!(storage
            .put_object("a.png", Bytes::from_static(b"x"), "image/png")
            .await
            .is_err());
    }
}
