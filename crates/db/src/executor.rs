//! Statement execution.
//!
//! Turns a bound [`Statement`] into a sqlx query, feeding each value through
//! `Query::bind` with the Rust type matching its declared [`SqlType`], and
//! runs it under a timeout. Rows come back wrapped in [`DbRow`] so the shaper
//! can read them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};
use sro_core::binder::{BoundValue, SqlType, SqlValue, Statement};
use sro_core::error::CoreError;
use sro_core::shaper::RowSource;

use crate::DbError;

/// A result row readable through [`RowSource`].
pub struct DbRow(pub PgRow);

impl DbRow {
    fn read<'r, T>(&'r self, column: &str) -> Result<Option<T>, CoreError>
    where
        T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
    {
        self.0
            .try_get::<Option<T>, _>(column)
            .map_err(|e| CoreError::Shape {
                column: column.to_string(),
                reason: e.to_string(),
            })
    }
}

impl RowSource for DbRow {
    fn int(&self, column: &str) -> Result<Option<i64>, CoreError> {
        self.read::<i64>(column)
    }

    fn float(&self, column: &str) -> Result<Option<f64>, CoreError> {
        self.read::<f64>(column)
    }

    fn text(&self, column: &str) -> Result<Option<String>, CoreError> {
        self.read::<String>(column)
    }

    fn timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>, CoreError> {
        self.read::<DateTime<Utc>>(column)
    }
}

/// Execute `stmt` and collect every row.
pub async fn fetch_all(
    pool: &PgPool,
    stmt: &Statement,
    timeout: Duration,
) -> Result<Vec<DbRow>, DbError> {
    tracing::debug!(sql = %stmt.to_literal_sql(), "Executing statement");

    let query = bind_all(sqlx::query(stmt.sql()), stmt.values());
    let rows = tokio::time::timeout(timeout, query.fetch_all(pool))
        .await
        .map_err(|_| DbError::Timeout(timeout))??;

    Ok(rows.into_iter().map(DbRow).collect())
}

/// Execute `stmt` and return the first row, if any.
pub async fn fetch_optional(
    pool: &PgPool,
    stmt: &Statement,
    timeout: Duration,
) -> Result<Option<DbRow>, DbError> {
    tracing::debug!(sql = %stmt.to_literal_sql(), "Executing statement");

    let query = bind_all(sqlx::query(stmt.sql()), stmt.values());
    let row = tokio::time::timeout(timeout, query.fetch_optional(pool))
        .await
        .map_err(|_| DbError::Timeout(timeout))??;

    Ok(row.map(DbRow))
}

/// Bind every value in ordinal order.
fn bind_all<'q>(
    mut q: Query<'q, Postgres, PgArguments>,
    values: &'q [BoundValue],
) -> Query<'q, Postgres, PgArguments> {
    for bound in values {
        q = match (&bound.value, bound.ty) {
            (SqlValue::SmallInt(v), _) => q.bind(*v),
            (SqlValue::Int(v), _) => q.bind(*v),
            (SqlValue::BigInt(v), _) => q.bind(*v),
            (SqlValue::Float(v), _) => q.bind(*v),
            (SqlValue::Text(v), _) => q.bind(v.as_str()),
            (SqlValue::Bool(v), _) => q.bind(*v),
            (SqlValue::Null, SqlType::SmallInt) => q.bind(None::<i16>),
            (SqlValue::Null, SqlType::Int) => q.bind(None::<i32>),
            (SqlValue::Null, SqlType::BigInt) => q.bind(None::<i64>),
            (SqlValue::Null, SqlType::Float) => q.bind(None::<f64>),
            (SqlValue::Null, SqlType::Text) => q.bind(None::<String>),
            (SqlValue::Null, SqlType::Bool) => q.bind(None::<bool>),
        };
    }
    q
}
