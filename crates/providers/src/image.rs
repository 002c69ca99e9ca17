//! Image generation seam.

use async_trait::async_trait;
use storyloom_core::image_size::ImageSize;

use crate::error::ProviderError;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub size: ImageSize,
}

/// Raw image bytes as returned by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage, ProviderError>;
}
