//! Generic image generation.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use storyloom_core::naming::scene_image_key;
use storyloom_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
    /// With `scene_index`, stores the image under the scene's key.
    #[serde(default)]
    pub story_id: Option<DbId>,
    #[serde(default)]
    pub scene_index: Option<u32>,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct GeneratedImageResponse {
    /// Base64 of the image bytes.
    pub image_data: String,
    pub content_type: String,
    pub stored_image_url: Option<String>,
    pub size: &'static str,
}

// ---------------------------------------------------------------------------
// POST /images
// ---------------------------------------------------------------------------

/// Generate one image. The payload is always returned; it is also stored
/// when a `(story_id, scene_index)` target is given. The story record is
/// not modified.
pub async fn generate(
    State(state): State<AppState>,
    Json(body): Json<GenerateImageRequest>,
) -> AppResult<impl IntoResponse> {
    let key = match (body.story_id, body.scene_index) {
        (Some(story_id), Some(scene_index)) => Some(scene_image_key(story_id, scene_index)),
        (None, None) => None,
        _ => {
            return Err(AppError::BadRequest(
                "story_id and scene_index must be given together".to_string(),
            ))
        }
    };

    let image = state
        .backfill
        .generate(&body.prompt, body.aspect_ratio, key.as_deref())
        .await?;

    tracing::debug!(
        size = image.size.as_str(),
        stored = image.stored_url.is_some(),
        bytes = image.image.bytes.len(),
        "Image generated",
    );

    Ok(Json(DataResponse {
        data: GeneratedImageResponse {
            image_data: BASE64.encode(&image.image.bytes),
            content_type: image.image.content_type,
            stored_image_url: image.stored_url,
            size: image.size.as_str(),
        },
    }))
}
