//! Generated follow-up panel prompts for a comic.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storyloom_core::types::{DbId, Timestamp};

/// A row from the `story_progressions` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoryProgression {
    pub id: DbId,
    pub comic_id: DbId,
    pub source_prompt: String,
    pub generated_prompts: Vec<String>,
    pub created_at: Timestamp,
}
