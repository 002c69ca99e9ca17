//! Prompt improvement audit rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storyloom_core::types::{DbId, Timestamp};

/// A row from the `prompt_history` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PromptHistory {
    pub id: DbId,
    pub prompt: String,
    pub improved_prompt: Option<String>,
    pub was_used: bool,
    pub created_at: Timestamp,
}
