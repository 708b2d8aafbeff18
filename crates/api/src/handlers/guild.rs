//! Handlers for guild detail pages.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use sro_core::error::CoreError;
use sro_core::ranking::guild_overview_cache_key;
use sro_db::repositories::GuildRepo;

use crate::error::{AppError, AppResult};
use crate::extract::PathParam;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/guild/overview/{guildName}
///
/// The guild's summary and member roster. 404 when no guild has that name.
pub async fn overview(
    State(state): State<AppState>,
    PathParam(guild_name): PathParam<String>,
) -> AppResult<impl IntoResponse> {
    let name = guild_name.trim();
    if name.is_empty() {
        return Err(missing_name());
    }

    let timeout = state.config.query_timeout();
    let pool = &state.pool;
    let data = state
        .cache
        .remember(
            &guild_overview_cache_key(name),
            state.config.ranking.guild_overview_ttl,
            || async move {
                let overview = GuildRepo::overview(pool, name, timeout)
                    .await?
                    .ok_or_else(|| CoreError::NotFound {
                        entity: "Guild",
                        name: name.to_string(),
                    })?;
                tracing::debug!(
                    guild = name,
                    members = overview.members.len(),
                    "Guild overview computed"
                );
                serde_json::to_value(overview)
                    .map_err(|e| AppError::InternalError(e.to_string()))
            },
        )
        .await?;

    Ok(Json(DataResponse::ok(data)))
}

/// GET /api/guild/overview/ (no name segment)
pub async fn overview_without_name() -> AppError {
    missing_name()
}

fn missing_name() -> AppError {
    AppError::BadRequest("guildName is required".into())
}
