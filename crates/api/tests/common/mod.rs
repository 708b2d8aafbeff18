#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use sro_api::config::ServerConfig;
use sro_api::router::build_app_router;
use sro_api::state::{AppState, ResponseCache};
use sro_core::cache::ManualClock;
use sro_core::ranking::RankingConfig;

pub const CH_MODEL: i32 = 1907;
pub const EU_MODEL: i32 = 14875;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: String::new(),
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:5173")],
        request_timeout_secs: 30,
        query_timeout_secs: 5,
        db_max_connections: 5,
        ranking: RankingConfig::default(),
    }
}

/// Build the full application router over `pool` with a frozen cache clock.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_clock(pool, Arc::new(ManualClock::new()))
}

/// Like [`build_test_app`], but the caller keeps the clock to expire entries.
pub fn build_test_app_with_clock(pool: PgPool, clock: Arc<ManualClock>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache: Arc::new(ResponseCache::with_clock(clock)),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed helpers
// ---------------------------------------------------------------------------

pub async fn insert_char(pool: &PgPool, id: i32, name: &str, model: i32, level: i16) {
    sqlx::query(
        "INSERT INTO _char (char_id, char_name16, nick_name16, ref_obj_id, cur_level, max_level) \
         VALUES ($1, $2, '', $3, $4, $4)",
    )
    .bind(id)
    .bind(name)
    .bind(model)
    .bind(level)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_job(pool: &PgPool, char_id: i32, job_type: i16, kills: i32, deaths: i32) {
    sqlx::query(
        "INSERT INTO _char_trade_conflict_job \
         (char_id, job_type, job_level, job_exp, reputation_point, kill_count, death_count) \
         VALUES ($1, $2, 1, 100, 0, $3, $4)",
    )
    .bind(char_id)
    .bind(job_type)
    .bind(kills)
    .bind(deaths)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_guild(pool: &PgPool, id: i32, name: &str) {
    sqlx::query("INSERT INTO _guild (id, name, lvl, gathered_sp) VALUES ($1, $2, 3, 2500)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn add_member(pool: &PgPool, guild_id: i32, char_id: i32, name: &str, class: i16) {
    sqlx::query(
        "INSERT INTO _guild_member (guild_id, char_id, char_name, member_class, char_level) \
         VALUES ($1, $2, $3, $4, 1)",
    )
    .bind(guild_id)
    .bind(char_id)
    .bind(name)
    .bind(class)
    .execute(pool)
    .await
    .unwrap();
}
