//! Database access for the ranking service.
//!
//! The game database is external and read-only from this service's point of
//! view. Every statement is composed and bound by `sro_core`, executed here
//! under a per-query timeout, and shaped back through `sro_core::shaper`.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sro_core::error::CoreError;

pub mod executor;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Errors produced by the db layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The driver or database rejected the statement.
    #[error("Database error: {0}")]
    Query(#[from] sqlx::Error),

    /// The statement did not finish within the configured query timeout.
    #[error("Query timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Composition, binding or shaping failed before or after execution.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the pool can reach the database.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}
