//! Repository for the `panels` table.

use sqlx::{PgExecutor, PgPool};
use storyloom_core::comic::{FIRST_SEQUENCE_NUMBER, RANDOM_PANEL_POOL};
use storyloom_core::types::DbId;

use crate::models::panel::{CreatePanel, Panel};

const COLUMNS: &str = "id, comic_id, prompt, image_url, sequence_number, created_at";

/// `image_url` of a reserved panel whose image is still being drawn.
pub const PENDING_IMAGE_URL: &str = "";

pub struct PanelRepo;

impl PanelRepo {
    /// Insert a panel. A duplicate `(comic_id, sequence_number)` fails with
    /// a unique violation on `uq_panels_comic_sequence`.
    pub async fn create(pool: &PgPool, input: &CreatePanel) -> Result<Panel, sqlx::Error> {
        let query = format!(
            "INSERT INTO panels (comic_id, prompt, image_url, sequence_number)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Panel>(&query)
            .bind(input.comic_id)
            .bind(&input.prompt)
            .bind(&input.image_url)
            .bind(input.sequence_number)
            .fetch_one(pool)
            .await
    }

    /// Reserve the next sequence number of a comic with a pending panel row.
    ///
    /// The comic row is locked while the number is read and the panel is
    /// inserted, so concurrent callers get distinct numbers. Returns `None`
    /// if the comic does not exist.
    pub async fn reserve_next(
        pool: &PgPool,
        comic_id: DbId,
        prompt: &str,
    ) -> Result<Option<Panel>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked = sqlx::query_scalar::<_, DbId>(
            "SELECT id FROM comics WHERE id = $1 FOR UPDATE",
        )
        .bind(comic_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let sequence_number = Self::next_sequence_number(&mut *tx, comic_id).await?;
        let query = format!(
            "INSERT INTO panels (comic_id, prompt, image_url, sequence_number)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let panel = sqlx::query_as::<_, Panel>(&query)
            .bind(comic_id)
            .bind(prompt)
            .bind(PENDING_IMAGE_URL)
            .bind(sequence_number)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(panel))
    }

    /// Attach the drawn image to a reserved panel.
    pub async fn set_image_url(
        pool: &PgPool,
        id: DbId,
        image_url: &str,
    ) -> Result<Option<Panel>, sqlx::Error> {
        let query = format!(
            "UPDATE panels SET image_url = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Panel>(&query)
            .bind(id)
            .bind(image_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a panel. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM panels WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Panels of a comic ordered by `sequence_number`. Pending panels are
    /// left out.
    pub async fn list_for_comic(pool: &PgPool, comic_id: DbId) -> Result<Vec<Panel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM panels
             WHERE comic_id = $1 AND image_url <> $2
             ORDER BY sequence_number ASC"
        );
        sqlx::query_as::<_, Panel>(&query)
            .bind(comic_id)
            .bind(PENDING_IMAGE_URL)
            .fetch_all(pool)
            .await
    }

    /// The panel with the highest sequence number, if any.
    pub async fn latest_for_comic(
        pool: &PgPool,
        comic_id: DbId,
    ) -> Result<Option<Panel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM panels
             WHERE comic_id = $1
             ORDER BY sequence_number DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Panel>(&query)
            .bind(comic_id)
            .fetch_optional(pool)
            .await
    }

    /// Sequence number the next panel of `comic_id` should take.
    pub async fn next_sequence_number<'e, E>(
        executor: E,
        comic_id: DbId,
    ) -> Result<i32, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let max = sqlx::query_scalar::<_, Option<i32>>(
            "SELECT MAX(sequence_number) FROM panels WHERE comic_id = $1",
        )
        .bind(comic_id)
        .fetch_one(executor)
        .await?;
        Ok(max.map_or(FIRST_SEQUENCE_NUMBER, |n| n + 1))
    }

    /// Image of a random panel among the most recent ones.
    pub async fn random_recent_image_url(pool: &PgPool) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT image_url FROM (
                 SELECT image_url FROM panels
                 WHERE image_url <> $2
                 ORDER BY created_at DESC
                 LIMIT $1
             ) recent
             ORDER BY random()
             LIMIT 1",
        )
        .bind(RANDOM_PANEL_POOL)
        .bind(PENDING_IMAGE_URL)
        .fetch_optional(pool)
        .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM panels")
            .fetch_one(pool)
            .await
    }
}
