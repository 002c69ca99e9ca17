//! Comic models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storyloom_core::types::{DbId, Timestamp};

/// A row from the `comics` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comic {
    pub id: DbId,
    pub title: Option<String>,
    pub initial_prompt: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateComic {
    pub title: Option<String>,
    pub initial_prompt: String,
}
