//! Repository for the `prompt_history` table.

use sqlx::PgPool;

use crate::models::prompt_history::PromptHistory;

const COLUMNS: &str = "id, prompt, improved_prompt, was_used, created_at";

pub struct PromptHistoryRepo;

impl PromptHistoryRepo {
    pub async fn create(
        pool: &PgPool,
        prompt: &str,
        improved_prompt: Option<&str>,
    ) -> Result<PromptHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO prompt_history (prompt, improved_prompt)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromptHistory>(&query)
            .bind(prompt)
            .bind(improved_prompt)
            .fetch_one(pool)
            .await
    }

    /// Flag the most recent entry whose original or improved text equals
    /// `prompt` as used. Returns `true` if an entry matched.
    pub async fn mark_used(pool: &PgPool, prompt: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE prompt_history SET was_used = TRUE
             WHERE id = (
                 SELECT id FROM prompt_history
                 WHERE prompt = $1 OR improved_prompt = $1
                 ORDER BY created_at DESC, id DESC
                 LIMIT 1
             )",
        )
        .bind(prompt)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
