use axum::routing::post;
use axum::Router;

use crate::handlers::{generation, images, prompts};
use crate::state::AppState;

/// Story generation routes mounted at `/generate`.
///
/// ```text
/// POST   /story           -> stream_story (NDJSON)
/// POST   /story-package   -> generate_package
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/story", post(generation::stream_story))
        .route("/story-package", post(generation::generate_package))
}

/// Image routes mounted at `/images`.
///
/// ```text
/// POST   /   -> generate
/// ```
pub fn images_router() -> Router<AppState> {
    Router::new().route("/", post(images::generate))
}

/// Prompt routes mounted at `/prompts`.
///
/// ```text
/// POST   /improve   -> improve
/// ```
pub fn prompts_router() -> Router<AppState> {
    Router::new().route("/improve", post(prompts::improve))
}
