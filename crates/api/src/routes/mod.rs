pub mod guild;
pub mod health;
pub mod ranking;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ranking
///     /meta                        ranking kinds, job types, races, TTLs
///     /cache/stats                 cache hit/miss counters
///     /player/{charName}           one character's player-ranking row
///     /job/{job}                   job ranking by job name
///     /job-kd/{job}                job K/D ranking by job name
///     /{kind}                      ranking page (limit, offset, filters)
///
/// /guild
///     /overview/{guildName}        guild summary and members
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/ranking", ranking::router())
        .nest("/guild", guild::router())
}
