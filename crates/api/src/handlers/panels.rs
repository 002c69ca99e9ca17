//! Handlers for individually stored panels.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use storyloom_core::comic::validate_sequence_number;
use storyloom_core::error::CoreError;
use storyloom_core::prompts::validate_prompt;
use storyloom_core::types::DbId;
use storyloom_db::models::panel::CreatePanel;
use storyloom_db::repositories::{ComicRepo, PanelRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PanelListParams {
    pub comic_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct RandomPanelImage {
    pub image_url: Option<String>,
}

// ---------------------------------------------------------------------------
// POST /panels
// ---------------------------------------------------------------------------

/// Store a panel whose image was produced elsewhere.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreatePanel>,
) -> AppResult<impl IntoResponse> {
    validate_prompt(&body.prompt)?;
    validate_sequence_number(body.sequence_number)?;
    if body.image_url.trim().is_empty() {
        return Err(AppError::BadRequest(
            "image_url must not be empty".to_string(),
        ));
    }
    let comic = ComicRepo::find_by_id(&state.pool, body.comic_id).await?;
    if comic.is_none() {
        return Err(CoreError::NotFound {
            entity: "Comic",
            id: body.comic_id,
        }
        .into());
    }

    let panel = PanelRepo::create(&state.pool, &body).await?;
    ComicRepo::touch(&state.pool, body.comic_id).await?;

    tracing::info!(
        comic_id = panel.comic_id,
        sequence_number = panel.sequence_number,
        "Panel stored",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: panel })))
}

// ---------------------------------------------------------------------------
// GET /panels?comic_id=
// ---------------------------------------------------------------------------

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PanelListParams>,
) -> AppResult<impl IntoResponse> {
    let comic_id = params
        .comic_id
        .ok_or_else(|| AppError::BadRequest("comic_id is required".to_string()))?;

    let panels = PanelRepo::list_for_comic(&state.pool, comic_id).await?;
    Ok(Json(DataResponse { data: panels }))
}

// ---------------------------------------------------------------------------
// GET /panels/random
// ---------------------------------------------------------------------------

/// Image of a random recent panel, for background art. `null` when no
/// panel exists.
pub async fn random(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let image_url = PanelRepo::random_recent_image_url(&state.pool).await?;
    Ok(Json(DataResponse {
        data: RandomPanelImage { image_url },
    }))
}
