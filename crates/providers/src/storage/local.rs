//! Filesystem blob store for development and tests.
//!
//! Objects are written to `{root}/{key}` and served by the API under the
//! configured public base URL.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::blob::{public_url, BlobStore};
use crate::error::ProviderError;

pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Resolve `key` under the root, refusing absolute paths and `..`.
    fn path_for(&self, key: &str) -> Result<PathBuf, ProviderError> {
        let relative = Path::new(key);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !safe {
            return Err(ProviderError::Storage(format!("Invalid blob key: {key:?}")));
        }
        Ok(self.root.join(relative))
    }

    /// Every file below the root as `(key, path)`.
    async fn list_files(&self) -> Result<Vec<(String, PathBuf)>, ProviderError> {
        let mut files = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_error(&dir, e)),
            };
            while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(&dir, e))? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(|e| io_error(&path, e))?;
                if file_type.is_dir() {
                    pending.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    let key = relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/");
                    files.push((key, path));
                }
            }
        }
        Ok(files)
    }
}

fn io_error(path: &Path, e: std::io::Error) -> ProviderError {
    ProviderError::Storage(format!("{}: {e}", path.display()))
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, ProviderError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }

        // Write then rename so readers never see a half-written image.
        let temp = path.with_extension("tmp");
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| io_error(&temp, e))?;
        tokio::fs::rename(&temp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;

        tracing::debug!(
            key,
            size_bytes = bytes.len(),
            "Stored blob on local filesystem",
        );
        Ok(public_url(&self.public_base_url, key))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, ProviderError> {
        let mut removed = 0;
        for (key, path) in self.list_files().await? {
            if key.starts_with(prefix) {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| io_error(&path, e))?;
                removed += 1;
            }
        }
        tracing::debug!(prefix, removed, "Deleted local blobs");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const KEY: &str = "7/scene-0.png";

    async fn put(store: &LocalBlobStore, key: &str, bytes: Vec<u8>) {
        store.put(key, bytes, "image/png").await.unwrap();
    }

    #[tokio::test]
    async fn put_writes_file_and_returns_public_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://localhost:3000/blobs");

        let url = store.put(KEY, vec![1, 2, 3], "image/png").await.unwrap();

        assert_eq!(url, "http://localhost:3000/blobs/7/scene-0.png");
        let written = tokio::fs::read(dir.path().join(KEY)).await.unwrap();
        assert_eq!(written, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn put_overwrites_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://blobs");

        put(&store, KEY, vec![1]).await;
        put(&store, KEY, vec![2, 2]).await;

        let written = tokio::fs::read(dir.path().join(KEY)).await.unwrap();
        assert_eq!(written, vec![2, 2]);
    }

    #[tokio::test]
    async fn delete_prefix_only_touches_matching_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://blobs");
        put(&store, KEY, vec![0]).await;
        put(&store, "7/scene-1.png", vec![0]).await;
        put(&store, "70/scene-0.png", vec![0]).await;

        assert_eq!(store.delete_prefix("7/").await.unwrap(), 2);
        assert!(dir.path().join("70/scene-0.png").exists());
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path(), "http://blobs");

        assert_matches!(
            store.put("../escape.png", vec![0], "image/png").await,
            Err(ProviderError::Storage(_))
        );
        assert_matches!(
            store.put("/abs.png", vec![0], "image/png").await,
            Err(ProviderError::Storage(_))
        );
    }
}
