//! Story models and DTOs.
//!
//! A story row stores the whole [`StoryPackage`] as JSONB; `title` and
//! `initial_prompt` are copies kept as plain columns for listing.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use storyloom_core::story::{Scene, StoryPackage};
use storyloom_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `stories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Story {
    pub id: DbId,
    pub title: String,
    pub initial_prompt: String,
    pub story_data: Json<StoryPackage>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Listing projection without the story document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StorySummary {
    pub id: DbId,
    pub title: String,
    pub initial_prompt: String,
    pub tagline: Option<String>,
    pub created_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStory {
    pub title: String,
    pub initial_prompt: String,
    pub story_data: StoryPackage,
}

impl CreateStory {
    /// Build the insert for a finished package, copying title and theme.
    pub fn from_package(package: StoryPackage) -> Self {
        Self {
            title: package.display_title().to_string(),
            initial_prompt: package.request_spec.theme.clone(),
            story_data: package,
        }
    }
}

// ---------------------------------------------------------------------------
// Scene patch result
// ---------------------------------------------------------------------------

/// Outcome of a field-level scene update.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenePatch {
    Updated(Scene),
    StoryNotFound,
    SceneNotFound,
}
