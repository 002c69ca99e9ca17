//! Repository for the `stories` table.
//!
//! Scene updates are field-level `jsonb_set` statements so two requests
//! patching different scenes of one story never overwrite each other.

use sqlx::types::Json;
use sqlx::PgPool;
use storyloom_core::story::Scene;
use storyloom_core::types::DbId;

use crate::models::story::{CreateStory, ScenePatch, Story, StorySummary};

const COLUMNS: &str = "id, title, initial_prompt, story_data, created_at, updated_at";

pub struct StoryRepo;

impl StoryRepo {
    /// Insert a new story, returning the created row.
    ///
    /// Callers validate the package first; the table only enforces that
    /// `story_data` is a JSON object.
    pub async fn create(pool: &PgPool, input: &CreateStory) -> Result<Story, sqlx::Error> {
        let query = format!(
            "INSERT INTO stories (title, initial_prompt, story_data)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(&input.title)
            .bind(&input.initial_prompt)
            .bind(Json(&input.story_data))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Story>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM stories WHERE id = $1");
        sqlx::query_as::<_, Story>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM stories WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// List stories newest first, without the story document.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StorySummary>, sqlx::Error> {
        sqlx::query_as::<_, StorySummary>(
            "SELECT id, title, initial_prompt, story_data->>'tagline' AS tagline, created_at
             FROM stories
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM stories")
            .fetch_one(pool)
            .await
    }

    /// Replace the embedded scene list. Returns `None` if the story does
    /// not exist.
    pub async fn replace_scenes(
        pool: &PgPool,
        id: DbId,
        scenes: &[Scene],
    ) -> Result<Option<Story>, sqlx::Error> {
        let query = format!(
            "UPDATE stories
             SET story_data = jsonb_set(story_data, '{{scenes}}', $2, true),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Story>(&query)
            .bind(id)
            .bind(Json(scenes))
            .fetch_optional(pool)
            .await
    }

    /// Set `scenes[scene_index].image_url` in a single statement.
    ///
    /// Only the addressed scene changes. An unknown story and an
    /// out-of-range index are reported separately.
    pub async fn set_scene_image(
        pool: &PgPool,
        id: DbId,
        scene_index: u32,
        image_url: &str,
    ) -> Result<ScenePatch, sqlx::Error> {
        let Ok(index) = i32::try_from(scene_index) else {
            return Self::missing_scene(pool, id).await;
        };

        let updated = sqlx::query_scalar::<_, Json<Scene>>(
            "UPDATE stories
             SET story_data = jsonb_set(
                     story_data,
                     ARRAY['scenes', $3, 'image_url'],
                     to_jsonb($4::text),
                     true
                 ),
                 updated_at = NOW()
             WHERE id = $1
               AND jsonb_typeof(story_data->'scenes') = 'array'
               AND $2 < jsonb_array_length(story_data->'scenes')
             RETURNING story_data->'scenes'->$2",
        )
        .bind(id)
        .bind(index)
        .bind(index.to_string())
        .bind(image_url)
        .fetch_optional(pool)
        .await?;

        match updated {
            Some(Json(scene)) => Ok(ScenePatch::Updated(scene)),
            None => Self::missing_scene(pool, id).await,
        }
    }

    async fn missing_scene(pool: &PgPool, id: DbId) -> Result<ScenePatch, sqlx::Error> {
        if Self::exists(pool, id).await? {
            Ok(ScenePatch::SceneNotFound)
        } else {
            Ok(ScenePatch::StoryNotFound)
        }
    }

    /// Delete a story. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM stories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
