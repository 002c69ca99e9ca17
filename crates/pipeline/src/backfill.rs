//! Image generation and durable storage of illustrations.
//!
//! One attempt is "generate, then upload"; a failure of either half retries
//! the whole attempt under the [`RetryPolicy`]. Uploads use deterministic
//! keys, so a retried or repeated backfill overwrites the same object.

use std::sync::Arc;

use storyloom_core::error::CoreError;
use storyloom_core::image_size::ImageSize;
use storyloom_core::naming::{comic_panel_key, scene_image_key};
use storyloom_core::prompts;
use storyloom_core::story::Scene;
use storyloom_core::types::DbId;
use storyloom_providers::{BlobStore, GeneratedImage, ImageGenerator, ImageRequest, ProviderError};

use crate::retry::RetryPolicy;

/// Result of one generation, optionally stored.
#[derive(Debug, Clone, PartialEq)]
pub struct BackfillImage {
    pub image: GeneratedImage,
    pub size: ImageSize,
    pub prompt: String,
    /// Public URL when the image was uploaded.
    pub stored_url: Option<String>,
}

pub struct ImageBackfill {
    images: Arc<dyn ImageGenerator>,
    blobs: Arc<dyn BlobStore>,
    retry: RetryPolicy,
}

impl ImageBackfill {
    pub fn new(
        images: Arc<dyn ImageGenerator>,
        blobs: Arc<dyn BlobStore>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            images,
            blobs,
            retry,
        }
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Generate an image for `prompt`, uploading it under `key` if given.
    pub async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: Option<f64>,
        key: Option<&str>,
    ) -> Result<BackfillImage, CoreError> {
        prompts::validate_prompt(prompt)?;
        let size = ImageSize::for_aspect_ratio(aspect_ratio);
        let request = ImageRequest {
            prompt: prompt.to_string(),
            size,
        };

        tracing::info!(size = size.as_str(), key, "Generating image");

        let (image, stored_url) = self
            .retry
            .run("image generation", |_| self.attempt(&request, key))
            .await
            .map_err(|e| crate::upstream("Failed to generate image", e))?;

        Ok(BackfillImage {
            image,
            size,
            prompt: request.prompt,
            stored_url,
        })
    }

    /// Illustrate scene `scene_index` of story `story_id`.
    ///
    /// Stores the image under `{story_id}/scene-{scene_index}.png` and
    /// returns the upload. Attaching the URL to the record is the caller's
    /// job.
    pub async fn illustrate_scene(
        &self,
        story_id: DbId,
        scene_index: u32,
        scene: &Scene,
        aspect_ratio: Option<f64>,
    ) -> Result<BackfillImage, CoreError> {
        let prompt = prompts::scene_image_prompt(scene);
        let key = scene_image_key(story_id, scene_index);
        self.generate(&prompt, aspect_ratio, Some(&key)).await
    }

    /// Draw and store panel `sequence_number` of comic `comic_id`.
    pub async fn illustrate_panel(
        &self,
        comic_id: DbId,
        sequence_number: i32,
        description: &str,
        aspect_ratio: Option<f64>,
    ) -> Result<BackfillImage, CoreError> {
        let prompt = prompts::comic_panel_prompt(description);
        let key = comic_panel_key(comic_id, sequence_number);
        self.generate(&prompt, aspect_ratio, Some(&key)).await
    }

    async fn attempt(
        &self,
        request: &ImageRequest,
        key: Option<&str>,
    ) -> Result<(GeneratedImage, Option<String>), ProviderError> {
        let image = self.images.generate_image(request).await?;
        let stored_url = match key {
            Some(key) => Some(
                self.blobs
                    .put(key, image.bytes.clone(), &image.content_type)
                    .await?,
            ),
            None => None,
        };
        Ok((image, stored_url))
    }
}
