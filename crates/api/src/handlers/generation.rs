//! Story generation endpoints.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;

use storyloom_core::error::CoreError;
use storyloom_core::story::GenerationRequest;
use storyloom_db::repositories::PromptHistoryRepo;

use crate::error::AppResult;
use crate::reconciler;
use crate::response::DataResponse;
use crate::state::AppState;

/// Content type of the generation stream. The frames are NDJSON; the
/// front-end reads the body incrementally under this type.
pub const STREAM_CONTENT_TYPE: &str = "text/event-stream";

#[derive(Debug, Deserialize)]
pub struct GenerateStoryRequest {
    pub request_spec: Option<GenerationRequest>,
}

impl GenerateStoryRequest {
    fn into_request(self) -> Result<GenerationRequest, CoreError> {
        let request = self
            .request_spec
            .ok_or_else(|| {
                CoreError::Validation("Theme is required in the request spec".to_string())
            })?
            .normalized();
        request.validate()?;
        Ok(request)
    }
}

/// Flag the theme as used if it came from the prompt history.
async fn mark_prompt_used(state: &AppState, theme: &str) {
    match PromptHistoryRepo::mark_used(&state.pool, theme).await {
        Ok(matched) => tracing::debug!(matched, "Prompt history checked"),
        Err(e) => tracing::warn!(error = %e, "Failed to mark prompt as used"),
    }
}

// ---------------------------------------------------------------------------
// POST /generate/story
// ---------------------------------------------------------------------------

/// Stream a generation run, one JSON frame per line.
///
/// Validation failures are returned as ordinary JSON errors before the
/// stream starts. Once streaming, failures arrive as an `error` frame and
/// the status stays 200.
pub async fn stream_story(
    State(state): State<AppState>,
    Json(body): Json<GenerateStoryRequest>,
) -> AppResult<Response> {
    let request = body.into_request()?;
    mark_prompt_used(&state, &request.theme).await;

    let frames = state
        .pipeline
        .clone()
        .stream(request)
        .map(|message| Ok::<_, Infallible>(message.to_ndjson_line()));

    Ok((
        [
            (header::CONTENT_TYPE, STREAM_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(frames),
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// POST /generate/story-package
// ---------------------------------------------------------------------------

/// Run a whole generation server-side and persist the result.
pub async fn generate_package(
    State(state): State<AppState>,
    Json(body): Json<GenerateStoryRequest>,
) -> AppResult<impl IntoResponse> {
    let request = body.into_request()?;
    mark_prompt_used(&state, &request.theme).await;

    let package = state.pipeline.generate_package(request).await?;
    let story = reconciler::create(&state.pool, package, None, None).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: story })))
}
