//! Handlers for stored stories and their scenes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use storyloom_core::error::CoreError;
use storyloom_core::image_size::ImageSize;
use storyloom_core::naming::story_prefix;
use storyloom_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use storyloom_core::story::{Character, Scene, SceneView, StoryMetadata, StoryPackage};
use storyloom_core::types::DbId;
use storyloom_db::repositories::StoryRepo;

use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::reconciler;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateStoryRequest {
    pub title: Option<String>,
    /// Defaults to the package's theme.
    pub initial_prompt: Option<String>,
    pub story_data: StoryPackage,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceScenesRequest {
    pub scenes: Vec<Scene>,
}

#[derive(Debug, Deserialize)]
pub struct SceneImageRequest {
    pub scene_index: u32,
    pub image_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IllustrateSceneRequest {
    /// Viewport `width / height`.
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct IllustrateDraftRequest {
    pub draft: StoryPackage,
    pub scene_index: u32,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A story with each scene joined to its prose.
#[derive(Debug, Serialize)]
pub struct StoryView<'a> {
    pub id: DbId,
    pub title: &'a str,
    pub tagline: &'a str,
    pub summary: &'a str,
    pub characters: &'a [Character],
    pub scenes: Vec<SceneView<'a>>,
    pub metadata: StoryMetadata,
}

/// Outcome of a server-side scene illustration.
#[derive(Debug, Serialize)]
pub struct IllustratedScene {
    pub story_id: DbId,
    pub scene_index: u32,
    pub image_url: String,
    pub size: &'static str,
    /// False when the image was stored but attaching it to the story
    /// failed; the client may retry with `PUT /stories/{id}/scenes`.
    pub persisted: bool,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn scene_at(package: &StoryPackage, scene_index: u32) -> AppResult<&Scene> {
    package.scenes.get(scene_index as usize).ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Scene",
            id: DbId::from(scene_index),
        })
    })
}

/// Generate and store the scene image, then attach it to the story.
///
/// A failed attach is logged and reported with `persisted: false`; the
/// stored image is not rolled back.
async fn illustrate(
    state: &AppState,
    story_id: DbId,
    scene_index: u32,
    scene: &Scene,
    aspect_ratio: Option<f64>,
) -> AppResult<IllustratedScene> {
    let image = state
        .backfill
        .illustrate_scene(story_id, scene_index, scene, aspect_ratio)
        .await?;
    let image_url = image.stored_url.ok_or_else(|| {
        AppError::InternalError("Image upload returned no URL".to_string())
    })?;

    let persisted =
        match reconciler::patch_scene_image(&state.pool, story_id, scene_index, &image_url).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    story_id,
                    scene_index,
                    error = %e,
                    "Scene image stored but not attached to story",
                );
                false
            }
        };

    Ok(IllustratedScene {
        story_id,
        scene_index,
        image_url,
        size: image.size.as_str(),
        persisted,
    })
}

// ---------------------------------------------------------------------------
// POST /stories
// ---------------------------------------------------------------------------

/// Persist a finished story package.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateStoryRequest>,
) -> AppResult<impl IntoResponse> {
    let story = reconciler::create(
        &state.pool,
        body.story_data,
        body.title,
        body.initial_prompt,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: story })))
}

// ---------------------------------------------------------------------------
// GET /stories
// ---------------------------------------------------------------------------

/// List stories newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<impl IntoResponse> {
    let limit = clamp_limit(params.limit, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT);
    let offset = clamp_offset(params.offset);

    let stories = StoryRepo::list(&state.pool, limit, offset).await?;
    tracing::debug!(count = stories.len(), "Listed stories");

    Ok(Json(DataResponse { data: stories }))
}

// ---------------------------------------------------------------------------
// GET /stories/{id}
// ---------------------------------------------------------------------------

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let story = reconciler::find(&state.pool, id).await?;
    Ok(Json(DataResponse { data: story }))
}

// ---------------------------------------------------------------------------
// DELETE /stories/{id}
// ---------------------------------------------------------------------------

/// Delete a story and, best-effort, its stored illustrations.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if !StoryRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "Story",
            id,
        }
        .into());
    }

    let prefix = story_prefix(id);
    match state.backfill.blobs().delete_prefix(&prefix).await {
        Ok(removed) => tracing::info!(story_id = id, removed, "Story deleted"),
        Err(e) => tracing::warn!(
            story_id = id,
            error = %e,
            "Story deleted but its images were not removed",
        ),
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /stories/{id}/view
// ---------------------------------------------------------------------------

/// Scenes joined with their prose by beat number. A scene whose beat has
/// no prose is returned with an empty paragraph list.
pub async fn view(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    let story = reconciler::find(&state.pool, id).await?;
    let package = &story.story_data.0;

    let view = StoryView {
        id: story.id,
        title: &story.title,
        tagline: &package.tagline,
        summary: &package.summary,
        characters: &package.characters,
        scenes: package.scene_views(),
        metadata: package.metadata,
    };
    Ok(Json(DataResponse { data: view }).into_response())
}

// ---------------------------------------------------------------------------
// PATCH /stories/{id}
// ---------------------------------------------------------------------------

/// Replace the embedded scene list.
pub async fn replace_scenes(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<ReplaceScenesRequest>,
) -> AppResult<impl IntoResponse> {
    let story = reconciler::replace_scenes(&state.pool, id, &body.scenes).await?;
    Ok(Json(DataResponse {
        data: story.story_data.0.scenes,
    }))
}

// ---------------------------------------------------------------------------
// PUT /stories/{id}/scenes
// ---------------------------------------------------------------------------

/// Attach an image URL to one scene.
pub async fn set_scene_image(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<SceneImageRequest>,
) -> AppResult<impl IntoResponse> {
    if body.image_url.trim().is_empty() {
        return Err(AppError::BadRequest(
            "image_url must not be empty".to_string(),
        ));
    }
    let scene =
        reconciler::patch_scene_image(&state.pool, id, body.scene_index, &body.image_url).await?;
    Ok(Json(DataResponse { data: scene }))
}

// ---------------------------------------------------------------------------
// POST /stories/{id}/scenes/{index}/illustrate
// ---------------------------------------------------------------------------

/// Generate, store and attach the illustration of a stored scene.
pub async fn illustrate_scene(
    State(state): State<AppState>,
    Path((id, scene_index)): Path<(DbId, u32)>,
    Json(body): Json<IllustrateSceneRequest>,
) -> AppResult<impl IntoResponse> {
    let story = reconciler::find(&state.pool, id).await?;
    let scene = scene_at(&story.story_data.0, scene_index)?;

    let result = illustrate(&state, id, scene_index, scene, body.aspect_ratio).await?;
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// POST /stories/illustrate
// ---------------------------------------------------------------------------

/// Persist an unsaved draft, then illustrate one of its scenes under the
/// new story id.
pub async fn illustrate_draft(
    State(state): State<AppState>,
    Json(body): Json<IllustrateDraftRequest>,
) -> AppResult<impl IntoResponse> {
    let scene = scene_at(&body.draft, body.scene_index)?.clone();
    let story = reconciler::create(&state.pool, body.draft, None, None).await?;

    tracing::info!(
        story_id = story.id,
        scene_index = body.scene_index,
        size = ImageSize::for_aspect_ratio(body.aspect_ratio).as_str(),
        "Draft persisted for illustration",
    );

    let result = illustrate(
        &state,
        story.id,
        body.scene_index,
        &scene,
        body.aspect_ratio,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}
