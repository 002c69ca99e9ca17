use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::stories;
use crate::state::AppState;

/// Story routes mounted at `/stories`.
///
/// ```text
/// GET    /                                -> list
/// POST   /                                -> create
/// POST   /illustrate                      -> illustrate_draft
/// GET    /{id}                            -> get_by_id
/// PATCH  /{id}                            -> replace_scenes
/// DELETE /{id}                            -> delete
/// GET    /{id}/view                       -> view
/// PUT    /{id}/scenes                     -> set_scene_image
/// POST   /{id}/scenes/{index}/illustrate  -> illustrate_scene
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(stories::list).post(stories::create))
        .route("/illustrate", post(stories::illustrate_draft))
        .route(
            "/{id}",
            get(stories::get_by_id)
                .patch(stories::replace_scenes)
                .delete(stories::delete),
        )
        .route("/{id}/view", get(stories::view))
        .route("/{id}/scenes", put(stories::set_scene_image))
        .route(
            "/{id}/scenes/{index}/illustrate",
            post(stories::illustrate_scene),
        )
}
