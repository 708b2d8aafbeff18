//! Handlers for leaderboard pages, single-row lookups and ranking metadata.
//!
//! Every data endpoint goes through the shared [`MemoCache`]: the cache key
//! covers every input that affects the result, and errors (including "not
//! found") are never cached.
//!
//! [`MemoCache`]: sro_core::cache::MemoCache

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use sro_core::error::CoreError;
use sro_core::game::{JobEntry, JobType, RaceEntry, JOB_TYPES, RACES};
use sro_core::ranking::{lookup_cache_key, RankingKind, RankingRequest};
use sro_db::repositories::RankingRepo;

use crate::error::{AppError, AppResult};
use crate::extract::PathParam;
use crate::query::RankingQuery;
use crate::response::DataResponse;
use crate::state::AppState;

/// Run a ranking request through the cache.
async fn cached_page(state: &AppState, request: RankingRequest) -> AppResult<Arc<Value>> {
    let key = request.cache_key();
    let ttl = state.config.ranking.ttl(request.kind);
    let timeout = state.config.query_timeout();
    let pool = &state.pool;
    let request = &request;

    state
        .cache
        .remember(&key, ttl, || async move {
            let rows = RankingRepo::fetch_page(pool, request, timeout).await?;
            tracing::debug!(
                kind = request.kind.slug(),
                rows = rows.len(),
                "Ranking page computed"
            );
            Ok::<_, AppError>(Value::Array(rows.into_iter().map(Value::Object).collect()))
        })
        .await
}

fn parse_kind(slug: &str) -> Result<RankingKind, CoreError> {
    RankingKind::from_slug(slug).ok_or_else(|| CoreError::NotFound {
        entity: "Ranking",
        name: slug.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// GET /api/ranking/{kind}
///
/// One page of the requested ranking. Accepts `limit`, `offset` and the
/// filters the kind supports.
pub async fn list_ranking(
    State(state): State<AppState>,
    PathParam(kind): PathParam<String>,
    query: RankingQuery,
) -> AppResult<impl IntoResponse> {
    let kind = parse_kind(&kind)?;
    let request = query.into_request(kind)?;
    let data = cached_page(&state, request).await?;

    Ok(Json(DataResponse::ok(data)))
}

/// GET /api/ranking/job/{job} and GET /api/ranking/job-kd/{job}
///
/// Job ranking with the job chosen by name (`trader`, `hunter`, `thief`).
/// The path job replaces any `jobType` query parameter.
async fn list_job_ranking(
    state: AppState,
    kind: RankingKind,
    job: &str,
    mut query: RankingQuery,
) -> AppResult<Json<DataResponse<Arc<Value>>>> {
    let job = JobType::from_slug(job).ok_or_else(|| CoreError::NotFound {
        entity: "Job",
        name: job.to_string(),
    })?;
    query.job_type = Some(job.code().to_string());

    let request = query.into_request(kind)?;
    let data = cached_page(&state, request).await?;

    Ok(Json(DataResponse::ok(data)))
}

pub async fn list_job(
    State(state): State<AppState>,
    PathParam(job): PathParam<String>,
    query: RankingQuery,
) -> AppResult<impl IntoResponse> {
    list_job_ranking(state, RankingKind::Job, &job, query).await
}

pub async fn list_job_kd(
    State(state): State<AppState>,
    PathParam(job): PathParam<String>,
    query: RankingQuery,
) -> AppResult<impl IntoResponse> {
    list_job_ranking(state, RankingKind::JobKd, &job, query).await
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// GET /api/ranking/player/{charName}
///
/// A single character's row in the player ranking, with its overall rank.
pub async fn find_player(
    State(state): State<AppState>,
    PathParam(char_name): PathParam<String>,
) -> AppResult<impl IntoResponse> {
    let name = char_name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("charName is required".into()));
    }

    let kind = RankingKind::Player;
    let key = lookup_cache_key(kind, name);
    let ttl = state.config.ranking.ttl(kind);
    let timeout = state.config.query_timeout();
    let pool = &state.pool;

    let data = state
        .cache
        .remember(&key, ttl, || async move {
            let row = RankingRepo::find_ranked(pool, kind, name, timeout)
                .await?
                .ok_or_else(|| CoreError::NotFound {
                    entity: "Character",
                    name: name.to_string(),
                })?;
            Ok::<_, AppError>(Value::Object(row))
        })
        .await?;

    Ok(Json(DataResponse::ok(data)))
}

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindMeta {
    pub kind: RankingKind,
    pub filters: Vec<&'static str>,
    pub lookup: bool,
    pub ttl_secs: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingMeta {
    pub kinds: Vec<KindMeta>,
    pub job_types: &'static [JobEntry],
    pub races: &'static [RaceEntry],
}

/// GET /api/ranking/meta
///
/// Static tables the frontend needs to build filter controls.
pub async fn meta(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let kinds = RankingKind::ALL
        .into_iter()
        .map(|kind| {
            let spec = kind.spec();
            KindMeta {
                kind,
                filters: spec
                    .accepted_filters()
                    .into_iter()
                    .map(|f| f.param_name())
                    .collect(),
                lookup: spec.lookup_column.is_some(),
                ttl_secs: state.config.ranking.ttl(kind).as_secs(),
            }
        })
        .collect();

    Ok(Json(DataResponse::ok(RankingMeta {
        kinds,
        job_types: JOB_TYPES,
        races: RACES,
    })))
}

/// GET /api/ranking/cache/stats
pub async fn cache_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = state.cache.stats().await;
    Ok(Json(DataResponse::ok(stats)))
}
