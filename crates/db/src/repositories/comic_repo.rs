//! Repository for the `comics` table.

use sqlx::PgPool;
use storyloom_core::types::DbId;

use crate::models::comic::{Comic, CreateComic};

const COLUMNS: &str = "id, title, initial_prompt, created_at, updated_at";

pub struct ComicRepo;

impl ComicRepo {
    pub async fn create(pool: &PgPool, input: &CreateComic) -> Result<Comic, sqlx::Error> {
        let query = format!(
            "INSERT INTO comics (title, initial_prompt)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Comic>(&query)
            .bind(&input.title)
            .bind(&input.initial_prompt)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Comic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM comics WHERE id = $1");
        sqlx::query_as::<_, Comic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List comics newest first.
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Comic>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM comics
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Comic>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comics")
            .fetch_one(pool)
            .await
    }

    /// Bump `updated_at` after a panel is added.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE comics SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
