//! Repository for ranked leaderboard pages.

use std::time::Duration;

use sqlx::PgPool;
use sro_core::ranking::{compose, compose_fallback, compose_lookup, RankingKind, RankingRequest};
use sro_core::shaper::{shape_row, shape_rows, ShapedRow};

use crate::executor::{fetch_all, fetch_optional};
use crate::DbError;

/// Provides read operations for every ranking kind.
pub struct RankingRepo;

impl RankingRepo {
    /// Fetch one page of a ranking, shaped for the frontend.
    ///
    /// Kinds with a fallback source (guild) retry with the simplified query
    /// when the primary one fails to execute. Timeouts are not retried.
    pub async fn fetch_page(
        pool: &PgPool,
        request: &RankingRequest,
        timeout: Duration,
    ) -> Result<Vec<ShapedRow>, DbError> {
        let spec = request.kind.spec();
        let stmt = compose(request)?;

        let rows = match fetch_all(pool, &stmt, timeout).await {
            Ok(rows) => rows,
            Err(DbError::Query(err)) => match compose_fallback(request)? {
                Some(fallback) => {
                    tracing::warn!(
                        kind = request.kind.slug(),
                        error = %err,
                        "Ranking query failed, using simplified fallback"
                    );
                    fetch_all(pool, &fallback, timeout).await?
                }
                None => return Err(DbError::Query(err)),
            },
            Err(other) => return Err(other),
        };

        Ok(shape_rows(&rows, spec.fields)?)
    }

    /// Find a single named row and its rank in the full ranking.
    pub async fn find_ranked(
        pool: &PgPool,
        kind: RankingKind,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<ShapedRow>, DbError> {
        let stmt = compose_lookup(kind, name)?;
        let row = fetch_optional(pool, &stmt, timeout).await?;
        Ok(row
            .map(|r| shape_row(&r, kind.spec().fields))
            .transpose()?)
    }
}
