//! S3 blob store.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;

use crate::blob::{public_url, BlobStore};
use crate::error::ProviderError;

pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }

    /// Build a client from the standard AWS environment (credentials,
    /// region, optional `AWS_ENDPOINT_URL`).
    pub async fn from_env(bucket: String, public_base_url: String) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, public_base_url)
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, ProviderError> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| storage_error("list_objects_v2", prefix, e))?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }
        Ok(keys)
    }
}

fn storage_error<E>(operation: &str, key: &str, e: E) -> ProviderError
where
    E: std::error::Error,
{
    ProviderError::Storage(format!("{operation} {key}: {}", DisplayErrorContext(e)))
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ProviderError> {
        let size_bytes = bytes.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| storage_error("put_object", key, e))?;

        tracing::debug!(bucket = %self.bucket, key, size_bytes, "Stored blob in S3");
        Ok(public_url(&self.public_base_url, key))
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize, ProviderError> {
        let keys = self.list_keys(prefix).await?;
        for key in &keys {
            self.client
                .delete_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|e| storage_error("delete_object", key, e))?;
        }
        tracing::debug!(bucket = %self.bucket, prefix, removed = keys.len(), "Deleted S3 blobs");
        Ok(keys.len())
    }
}
