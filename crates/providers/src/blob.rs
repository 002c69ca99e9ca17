//! Durable blob storage seam.

use async_trait::async_trait;

use crate::error::ProviderError;

/// Key/value blob storage with public URLs.
///
/// `put` overwrites an existing object under the same key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<String, ProviderError>;

    /// Delete every object whose key starts with `prefix`. Returns how many
    /// objects were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize, ProviderError>;
}

/// Join a public base URL and a key with exactly one slash.
pub fn public_url(base_url: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
