//! Sample data seeding.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use storyloom_db::seed::seed_sample_data;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /seed
// ---------------------------------------------------------------------------

/// Insert sample comics and a sample story into empty tables. Repeated
/// calls insert nothing.
pub async fn seed(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let outcome = seed_sample_data(&state.pool, chrono::Utc::now()).await?;

    if outcome.is_noop() {
        tracing::info!("Sample data already present");
    } else {
        tracing::info!(
            comics = outcome.comics_created,
            panels = outcome.panels_created,
            stories = outcome.stories_created,
            "Sample data seeded",
        );
    }

    Ok(Json(DataResponse { data: outcome }))
}
