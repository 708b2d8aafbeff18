//! Route definitions for guild pages, mounted at `/guild`.

use axum::routing::get;
use axum::Router;

use crate::handlers::guild;
use crate::state::AppState;

/// ```text
/// GET /overview/{guildName}   -> overview
/// GET /overview/              -> overview_without_name (400)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/overview/{guild_name}", get(guild::overview))
        .route("/overview/", get(guild::overview_without_name))
}
