//! Prompt improvement.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use storyloom_db::repositories::PromptHistoryRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImprovePromptRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct ImprovedPrompt {
    pub improved_prompt: String,
}

// ---------------------------------------------------------------------------
// POST /prompts/improve
// ---------------------------------------------------------------------------

/// Rewrite a prompt into a richer one. The pair is recorded in the prompt
/// history; a failed history write is logged and ignored.
pub async fn improve(
    State(state): State<AppState>,
    Json(body): Json<ImprovePromptRequest>,
) -> AppResult<impl IntoResponse> {
    let improved_prompt = state.improver.improve(&body.prompt).await?;

    if let Err(e) =
        PromptHistoryRepo::create(&state.pool, &body.prompt, Some(&improved_prompt)).await
    {
        tracing::warn!(error = %e, "Failed to record prompt history");
    }

    Ok(Json(DataResponse {
        data: ImprovedPrompt { improved_prompt },
    }))
}
