pub mod comics;
pub mod generation;
pub mod health;
pub mod panels;
pub mod stories;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /stories                                   list, create
/// /stories/illustrate                        persist draft, illustrate one scene
/// /stories/{id}                              get, replace scenes (PATCH), delete
/// /stories/{id}/view                         scenes joined with prose
/// /stories/{id}/scenes                       attach scene image (PUT)
/// /stories/{id}/scenes/{index}/illustrate    generate + attach scene image
///
/// /comics                                    list, create
/// /comics/{id}                               comic with panels
/// /comics/{id}/progression                   list, generate follow-up prompts
/// /comics/{id}/panels/next                   generate + store next panel
///
/// /panels                                    list (?comic_id=), create
/// /panels/random                             random recent panel image
///
/// /images                                    generate one image (POST)
/// /generate/story                            streamed generation (POST)
/// /generate/story-package                    generate + persist (POST)
/// /prompts/improve                           improve a prompt (POST)
/// /seed                                      seed sample data (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/stories", stories::router())
        .nest("/comics", comics::router())
        .nest("/panels", panels::router())
        .nest("/images", generation::images_router())
        .nest("/generate", generation::router())
        .nest("/prompts", generation::prompts_router())
        .route("/seed", post(handlers::seed::seed))
}
