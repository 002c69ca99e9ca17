//! Repository for the `story_progressions` table.

use sqlx::PgPool;
use storyloom_core::types::DbId;

use crate::models::story_progression::StoryProgression;

const COLUMNS: &str = "id, comic_id, source_prompt, generated_prompts, created_at";

pub struct StoryProgressionRepo;

impl StoryProgressionRepo {
    pub async fn create(
        pool: &PgPool,
        comic_id: DbId,
        source_prompt: &str,
        generated_prompts: &[String],
    ) -> Result<StoryProgression, sqlx::Error> {
        let query = format!(
            "INSERT INTO story_progressions (comic_id, source_prompt, generated_prompts)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoryProgression>(&query)
            .bind(comic_id)
            .bind(source_prompt)
            .bind(generated_prompts)
            .fetch_one(pool)
            .await
    }

    /// Progressions of a comic, newest first.
    pub async fn list_for_comic(
        pool: &PgPool,
        comic_id: DbId,
    ) -> Result<Vec<StoryProgression>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM story_progressions
             WHERE comic_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, StoryProgression>(&query)
            .bind(comic_id)
            .fetch_all(pool)
            .await
    }
}
