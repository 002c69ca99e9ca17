use axum::routing::get;
use axum::Router;

use crate::handlers::panels;
use crate::state::AppState;

/// Panel routes mounted at `/panels`.
///
/// ```text
/// GET    /?comic_id=   -> list
/// POST   /             -> create
/// GET    /random       -> random
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(panels::list).post(panels::create))
        .route("/random", get(panels::random))
}
