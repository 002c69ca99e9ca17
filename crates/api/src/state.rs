use std::sync::Arc;

use storyloom_pipeline::{ImageBackfill, PromptImprover, StoryPipeline};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: storyloom_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Staged story generation.
    pub pipeline: Arc<StoryPipeline>,
    /// Prompt improvement and comic progression.
    pub improver: Arc<PromptImprover>,
    /// Image generation and storage.
    pub backfill: Arc<ImageBackfill>,
}
