use axum::routing::{get, post};
use axum::Router;

use crate::handlers::comics;
use crate::state::AppState;

/// Comic routes mounted at `/comics`.
///
/// ```text
/// GET    /                    -> list
/// POST   /                    -> create
/// GET    /{id}                -> get_by_id
/// GET    /{id}/progression    -> list_progressions
/// POST   /{id}/progression    -> create_progression
/// POST   /{id}/panels/next    -> generate_panel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(comics::list).post(comics::create))
        .route("/{id}", get(comics::get_by_id))
        .route(
            "/{id}/progression",
            get(comics::list_progressions).post(comics::create_progression),
        )
        .route("/{id}/panels/next", post(comics::generate_panel))
}
