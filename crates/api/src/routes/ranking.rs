//! Route definitions for leaderboards, mounted at `/ranking`.

use axum::routing::get;
use axum::Router;

use crate::handlers::ranking;
use crate::state::AppState;

/// ```text
/// GET /meta                -> meta
/// GET /cache/stats         -> cache_stats
/// GET /player/{charName}   -> find_player
/// GET /job/{job}           -> list_job
/// GET /job-kd/{job}        -> list_job_kd
/// GET /{kind}              -> list_ranking
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/meta", get(ranking::meta))
        .route("/cache/stats", get(ranking::cache_stats))
        .route("/player/{char_name}", get(ranking::find_player))
        .route("/job/{job}", get(ranking::list_job))
        .route("/job-kd/{job}", get(ranking::list_job_kd))
        .route("/{kind}", get(ranking::list_ranking))
}
