//! Persistence of generated stories.
//!
//! `create` writes a finished package as one row. Later scene edits are
//! field-level patches on the stored document, so concurrent updates to
//! different scenes of the same story do not overwrite each other.

use sqlx::PgPool;
use storyloom_core::error::CoreError;
use storyloom_core::story::{Scene, StoryPackage};
use storyloom_core::types::DbId;
use storyloom_db::models::story::{CreateStory, ScenePatch, Story};
use storyloom_db::repositories::StoryRepo;

use crate::error::AppResult;

/// Persist a completed package.
///
/// Rejects a package without prose. Metadata is recomputed from the prose
/// so the stored word count always matches the stored text.
pub async fn create(
    pool: &PgPool,
    mut package: StoryPackage,
    title: Option<String>,
    initial_prompt: Option<String>,
) -> AppResult<Story> {
    package.validate_for_persistence()?;
    package.metadata = package.compute_metadata();

    let mut input = CreateStory::from_package(package);
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        input.title = title;
    }
    if let Some(prompt) = initial_prompt.filter(|p| !p.trim().is_empty()) {
        input.initial_prompt = prompt;
    }

    let story = StoryRepo::create(pool, &input).await?;
    tracing::info!(story_id = story.id, title = %story.title, "Story persisted");
    Ok(story)
}

/// Attach `image_url` to scene `scene_index` of story `id`.
///
/// Unknown stories and out-of-range indexes are both not-found.
pub async fn patch_scene_image(
    pool: &PgPool,
    id: DbId,
    scene_index: u32,
    image_url: &str,
) -> AppResult<Scene> {
    match StoryRepo::set_scene_image(pool, id, scene_index, image_url).await? {
        ScenePatch::Updated(scene) => {
            tracing::info!(story_id = id, scene_index, "Scene image attached");
            Ok(scene)
        }
        ScenePatch::StoryNotFound => Err(CoreError::NotFound {
            entity: "Story",
            id,
        }
        .into()),
        ScenePatch::SceneNotFound => Err(CoreError::NotFound {
            entity: "Scene",
            id: DbId::from(scene_index),
        }
        .into()),
    }
}

/// Replace the whole scene list of story `id`.
pub async fn replace_scenes(pool: &PgPool, id: DbId, scenes: &[Scene]) -> AppResult<Story> {
    let story = StoryRepo::replace_scenes(pool, id, scenes)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Story",
            id,
        })?;
    tracing::info!(
        story_id = id,
        scene_count = scenes.len(),
        "Story scenes replaced",
    );
    Ok(story)
}

/// Load story `id` or fail with not-found.
pub async fn find(pool: &PgPool, id: DbId) -> AppResult<Story> {
    let story = StoryRepo::find_by_id(pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Story",
            id,
        })?;
    Ok(story)
}
