//! Handlers for comics, their panels and generated progressions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use storyloom_core::comic::validate_progression_count;
use storyloom_core::error::CoreError;
use storyloom_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use storyloom_core::prompts::{comic_title, validate_prompt, DEFAULT_PROGRESSION_COUNT};
use storyloom_core::types::DbId;
use storyloom_db::models::comic::{Comic, CreateComic};
use storyloom_db::models::panel::Panel;
use storyloom_db::repositories::{ComicRepo, PanelRepo, StoryProgressionRepo};

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateComicRequest {
    pub initial_prompt: String,
    /// Derived from the prompt when absent.
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProgressionRequest {
    /// Continue from this text instead of the latest panel.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NextPanelRequest {
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ComicWithPanels {
    #[serde(flatten)]
    pub comic: Comic,
    pub panels: Vec<Panel>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_comic(state: &AppState, id: DbId) -> AppResult<Comic> {
    let comic = ComicRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Comic",
            id,
        })?;
    Ok(comic)
}

// ---------------------------------------------------------------------------
// POST /comics
// ---------------------------------------------------------------------------

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateComicRequest>,
) -> AppResult<impl IntoResponse> {
    validate_prompt(&body.initial_prompt)?;

    let title = body
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| comic_title(&body.initial_prompt));
    let input = CreateComic {
        title: Some(title),
        initial_prompt: body.initial_prompt,
    };

    let comic = ComicRepo::create(&state.pool, &input).await?;
    tracing::info!(comic_id = comic.id, "Comic created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: comic })))
}

// ---------------------------------------------------------------------------
// GET /comics
// ---------------------------------------------------------------------------

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let comics = ComicRepo::list(&state.pool, limit, offset).await?;
    Ok(Json(DataResponse { data: comics }))
}

// ---------------------------------------------------------------------------
// GET /comics/{id}
// ---------------------------------------------------------------------------

/// A comic with its panels in sequence order.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let comic = find_comic(&state, id).await?;
    let panels = PanelRepo::list_for_comic(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: ComicWithPanels { comic, panels },
    }))
}

// ---------------------------------------------------------------------------
// GET /comics/{id}/progression
// ---------------------------------------------------------------------------

pub async fn list_progressions(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_comic(&state, id).await?;
    let progressions = StoryProgressionRepo::list_for_comic(&state.pool, id).await?;
    Ok(Json(DataResponse { data: progressions }))
}

// ---------------------------------------------------------------------------
// POST /comics/{id}/progression
// ---------------------------------------------------------------------------

/// Generate follow-up panel prompts and keep them with the comic.
///
/// Continues from the request prompt, else the latest panel, else the
/// comic's initial prompt.
pub async fn create_progression(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<ProgressionRequest>,
) -> AppResult<impl IntoResponse> {
    let comic = find_comic(&state, id).await?;
    let count = body.count.unwrap_or(DEFAULT_PROGRESSION_COUNT);
    validate_progression_count(count)?;

    let source_prompt = match body.prompt.filter(|p| !p.trim().is_empty()) {
        Some(prompt) => prompt,
        None => match PanelRepo::latest_for_comic(&state.pool, id).await? {
            Some(panel) => panel.prompt,
            None => comic.initial_prompt,
        },
    };

    let prompts = state.improver.progression(&source_prompt, count).await?;
    let progression =
        StoryProgressionRepo::create(&state.pool, id, &source_prompt, &prompts).await?;
    tracing::info!(
        comic_id = id,
        progression_id = progression.id,
        prompts = progression.generated_prompts.len(),
        "Progression generated",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: progression }),
    ))
}

// ---------------------------------------------------------------------------
// POST /comics/{id}/panels/next
// ---------------------------------------------------------------------------

/// Reserve the next panel, draw and store its image, then attach it.
///
/// The sequence number is reserved before the image is drawn so two
/// concurrent requests never share a number or a blob key. A reserved panel
/// whose image fails is removed again.
pub async fn generate_panel(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<NextPanelRequest>,
) -> AppResult<impl IntoResponse> {
    validate_prompt(&body.prompt)?;

    let reserved = PanelRepo::reserve_next(&state.pool, id, &body.prompt)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Comic",
            id,
        })?;
    let sequence_number = reserved.sequence_number;

    let image_url = match draw_panel(&state, id, sequence_number, &body).await {
        Ok(url) => url,
        Err(e) => {
            if let Err(cleanup) = PanelRepo::delete(&state.pool, reserved.id).await {
                tracing::warn!(
                    comic_id = id,
                    panel_id = reserved.id,
                    error = %cleanup,
                    "Reserved panel could not be released",
                );
            }
            return Err(e);
        }
    };

    let panel = PanelRepo::set_image_url(&state.pool, reserved.id, &image_url)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Panel",
            id: reserved.id,
        })?;
    ComicRepo::touch(&state.pool, id).await?;

    tracing::info!(comic_id = id, sequence_number, "Panel generated");
    Ok((StatusCode::CREATED, Json(DataResponse { data: panel })))
}

async fn draw_panel(
    state: &AppState,
    comic_id: DbId,
    sequence_number: i32,
    body: &NextPanelRequest,
) -> AppResult<String> {
    let image = state
        .backfill
        .illustrate_panel(comic_id, sequence_number, &body.prompt, body.aspect_ratio)
        .await?;
    image
        .stored_url
        .ok_or_else(|| AppError::InternalError("Panel upload returned no URL".to_string()))
}
