//! Idempotent sample data.
//!
//! Each table group is seeded only when it is empty. The whole run holds a
//! transaction-scoped advisory lock so two concurrent seed requests cannot
//! both observe an empty table and insert twice.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;
use storyloom_core::fixtures::{sample_panel_count, sample_panel_url, sample_story, SAMPLE_COMICS};
use storyloom_core::types::{DbId, Timestamp};

/// Advisory lock key for seeding ("SEED" in ASCII).
const SEED_LOCK_KEY: i64 = 0x5345_4544;

/// Rows inserted by one seed run. All zeros when the data already existed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedOutcome {
    pub comics_created: u32,
    pub panels_created: u32,
    pub stories_created: u32,
}

impl SeedOutcome {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Seed sample comics (with panels) and one sample story.
pub async fn seed_sample_data(pool: &PgPool, now: Timestamp) -> Result<SeedOutcome, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut outcome = SeedOutcome::default();

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SEED_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    let comics: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comics")
        .fetch_one(&mut *tx)
        .await?;
    if comics == 0 {
        for (comic_index, (title, prompt)) in SAMPLE_COMICS.iter().enumerate() {
            let comic_id: DbId = sqlx::query_scalar(
                "INSERT INTO comics (title, initial_prompt) VALUES ($1, $2) RETURNING id",
            )
            .bind(*title)
            .bind(*prompt)
            .fetch_one(&mut *tx)
            .await?;
            outcome.comics_created += 1;

            for panel_index in 0..sample_panel_count(comic_index) {
                let sequence_number = panel_index as i32 + 1;
                sqlx::query(
                    "INSERT INTO panels (comic_id, prompt, image_url, sequence_number)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(comic_id)
                .bind(format!("{prompt} - Panel {sequence_number}"))
                .bind(sample_panel_url(comic_index, panel_index))
                .bind(sequence_number)
                .execute(&mut *tx)
                .await?;
                outcome.panels_created += 1;
            }
        }
    }

    let stories: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stories")
        .fetch_one(&mut *tx)
        .await?;
    if stories == 0 {
        let story = sample_story(now);
        sqlx::query(
            "INSERT INTO stories (title, initial_prompt, story_data) VALUES ($1, $2, $3)",
        )
        .bind(story.display_title())
        .bind(&story.request_spec.theme)
        .bind(Json(&story))
        .execute(&mut *tx)
        .await?;
        outcome.stories_created += 1;
    }

    tx.commit().await?;
    Ok(outcome)
}
