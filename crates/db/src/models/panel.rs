//! Comic panel models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storyloom_core::types::{DbId, Timestamp};

/// A row from the `panels` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Panel {
    pub id: DbId,
    pub comic_id: DbId,
    pub prompt: String,
    pub image_url: String,
    pub sequence_number: i32,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePanel {
    pub comic_id: DbId,
    pub prompt: String,
    pub image_url: String,
    pub sequence_number: i32,
}
