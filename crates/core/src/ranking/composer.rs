//! Builds ranked, paginated statements from a [`RankingSpec`].
//!
//! Shape of every ranking statement:
//!
//! ```text
//! SELECT ranked.* FROM (
//!     SELECT ROW_NUMBER() OVER (ORDER BY <tie-break chain>) AS rank_no, src.*
//!     FROM (<source select> WHERE <conditions + filters> [GROUP BY ...]) src
//! ) ranked
//! WHERE ranked.rank_no > @offset AND ranked.rank_no <= @upper
//! ORDER BY ranked.rank_no
//! ```
//!
//! Ranks are assigned over the whole filtered set before the page window is
//! applied, so a row's rank never depends on the requested offset.

use crate::binder::{Params, SqlType, Statement};
use crate::error::CoreError;
use crate::filters::{FilterBuilder, RankingFilters};

use super::specs::{Direction, RankingSpec, SourceSpec};
use super::{RankingKind, RankingRequest};

/// Compose the primary statement for a ranking request.
pub fn compose(request: &RankingRequest) -> Result<Statement, CoreError> {
    let spec = request.kind.spec();
    compose_page(spec, &spec.source, request)
}

/// Compose the simplified statement for kinds that declare a fallback.
pub fn compose_fallback(request: &RankingRequest) -> Result<Option<Statement>, CoreError> {
    let spec = request.kind.spec();
    spec.fallback
        .as_ref()
        .map(|source| compose_page(spec, source, request))
        .transpose()
}

/// Compose a statement selecting one named row from a full ranking.
///
/// The name is matched case-insensitively against the kind's lookup column
/// after ranking, so the returned rank is the row's position in the
/// unfiltered leaderboard.
pub fn compose_lookup(kind: RankingKind, name: &str) -> Result<Statement, CoreError> {
    let spec = kind.spec();
    let column = spec.lookup_column.ok_or_else(|| {
        CoreError::Validation(format!("the {} ranking does not support lookups", kind.slug()))
    })?;

    let (ranked, mut params) = ranked_source(spec, &spec.source, &RankingFilters::default())?;
    params.input("lookup_name", SqlType::Text, name.trim())?;

    let template = format!(
        "SELECT ranked.* FROM ({ranked}) ranked \
         WHERE lower(ranked.{column}) = lower(@lookup_name) \
         ORDER BY ranked.rank_no LIMIT 1"
    );
    Statement::prepare(&template, &params)
}

fn compose_page(
    spec: &RankingSpec,
    source: &SourceSpec,
    request: &RankingRequest,
) -> Result<Statement, CoreError> {
    request
        .filters
        .ensure_only(&spec.accepted_filters(), spec.kind.slug())?;

    let (ranked, mut params) = ranked_source(spec, source, &request.filters)?;
    params
        .input("offset", SqlType::BigInt, request.page.offset)?
        .input("upper", SqlType::BigInt, request.page.upper_rank())?;

    let template = format!(
        "SELECT ranked.* FROM ({ranked}) ranked \
         WHERE ranked.rank_no > @offset AND ranked.rank_no <= @upper \
         ORDER BY ranked.rank_no"
    );
    Statement::prepare(&template, &params)
}

/// The windowed inner query plus the parameters its filters bind.
fn ranked_source(
    spec: &RankingSpec,
    source: &SourceSpec,
    filters: &RankingFilters,
) -> Result<(String, Params), CoreError> {
    let mut builder = FilterBuilder::new();
    for condition in source.conditions {
        builder.push_static(condition);
    }
    builder.push_filters(filters, spec.filters)?;
    let (where_clause, params) = builder.build()?;

    let mut source_sql = source.select.to_string();
    if !where_clause.is_empty() {
        source_sql.push(' ');
        source_sql.push_str(&where_clause);
    }
    if let Some(group_by) = source.group_by {
        source_sql.push_str(" GROUP BY ");
        source_sql.push_str(group_by);
    }

    let ranked = format!(
        "SELECT ROW_NUMBER() OVER (ORDER BY {}) AS rank_no, src.* FROM ({source_sql}) src",
        order_by(spec)
    );
    Ok((ranked, params))
}

fn order_by(spec: &RankingSpec) -> String {
    spec.tie_break
        .iter()
        .map(|t| {
            let dir = match t.direction {
                Direction::Asc => "ASC",
                Direction::Desc => "DESC",
            };
            format!("src.{} {dir} NULLS LAST", t.column)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::binder::SqlValue;
    use crate::game::{JobType, Race};
    use crate::pagination::Page;

    fn request(kind: RankingKind, filters: RankingFilters) -> RankingRequest {
        RankingRequest::new(
            kind,
            Page {
                limit: 10,
                offset: 20,
            },
            filters,
        )
    }

    #[test]
    fn player_ranking_orders_by_level_then_exp_then_id() {
        let stmt = compose(&request(RankingKind::Player, RankingFilters::default())).unwrap();
        assert!(stmt.sql().contains(
            "ROW_NUMBER() OVER (ORDER BY src.level DESC NULLS LAST, src.exp DESC NULLS LAST, \
             src.char_id ASC NULLS LAST)"
        ));
    }

    #[test]
    fn job_kd_chain_is_ratio_exp_kills_level() {
        let stmt = compose(&request(RankingKind::JobKd, RankingFilters::default())).unwrap();
        assert!(stmt.sql().contains(
            "ORDER BY src.kd_ratio DESC NULLS LAST, src.job_exp DESC NULLS LAST, \
             src.kills DESC NULLS LAST, src.job_level DESC NULLS LAST, src.char_id ASC NULLS LAST"
        ));
        assert!(stmt
            .sql()
            .contains("CASE WHEN COALESCE(j.death_count, 0) = 0 THEN COALESCE(j.kill_count, 0)::float8"));
    }

    #[test]
    fn pagination_is_applied_after_ranking() {
        let stmt = compose(&request(RankingKind::Honor, RankingFilters::default())).unwrap();
        let sql = stmt.sql();

        let window = sql.find("ROW_NUMBER()").unwrap();
        let page = sql.find("ranked.rank_no > $1").unwrap();
        assert!(window < page);
        assert!(sql.ends_with("ranked.rank_no <= $2 ORDER BY ranked.rank_no"));
        assert_eq!(stmt.values()[0].value, SqlValue::BigInt(20));
        assert_eq!(stmt.values()[1].value, SqlValue::BigInt(30));
    }

    #[test]
    fn absent_filters_add_no_clause() {
        let stmt = compose(&request(RankingKind::Player, RankingFilters::default())).unwrap();
        assert!(stmt.sql().contains("FROM _char c"));
        assert!(stmt.sql().contains("WHERE c.deleted = 0) src"));
        assert_eq!(stmt.values().len(), 2);
    }

    #[test]
    fn active_filters_are_bound_in_source_where() {
        let filters = RankingFilters {
            job_type: Some(JobType(1)),
            race: Some(Race::Chinese),
            min_level: Some(80),
            ..Default::default()
        };
        let stmt = compose(&request(RankingKind::Job, filters)).unwrap();
        let sql = stmt.sql();

        assert!(sql.contains(
            "WHERE c.deleted = 0 AND j.job_type = $1 AND c.ref_obj_id BETWEEN $2 AND $3 \
             AND c.cur_level >= $4) src"
        ));
        let values: Vec<&SqlValue> = stmt.values().iter().map(|v| &v.value).collect();
        assert_eq!(
            values,
            vec![
                &SqlValue::Int(1),
                &SqlValue::Int(1907),
                &SqlValue::Int(1932),
                &SqlValue::Int(80),
                &SqlValue::BigInt(20),
                &SqlValue::BigInt(30),
            ]
        );
    }

    #[test]
    fn grouped_kinds_filter_before_grouping() {
        let filters = RankingFilters {
            fortress_id: Some(3),
            ..Default::default()
        };
        let stmt = compose(&request(RankingKind::FortressGuild, filters)).unwrap();
        assert!(stmt
            .sql()
            .contains("WHERE g.id > 0 AND r.fortress_id = $1 GROUP BY g.id, g.name, g.lvl) src"));
    }

    #[test]
    fn unsupported_filter_fails_fast() {
        let filters = RankingFilters {
            min_plus: Some(7),
            ..Default::default()
        };
        let err = compose(&request(RankingKind::Player, filters)).unwrap_err();
        assert_matches!(err, CoreError::Validation(msg) if msg.contains("minPlus") && msg.contains("player"));
    }

    #[test]
    fn guild_fallback_keeps_ranking_shape() {
        let req = request(RankingKind::Guild, RankingFilters::default());
        let fallback = compose_fallback(&req).unwrap().unwrap();

        assert!(fallback.sql().contains("NULL::bigint AS avg_level"));
        assert!(fallback.sql().contains("ranked.rank_no > $1"));
        assert!(compose_fallback(&request(RankingKind::Player, RankingFilters::default()))
            .unwrap()
            .is_none());
    }

    #[test]
    fn lookup_matches_name_after_ranking() {
        let stmt = compose_lookup(RankingKind::Player, " Aria ").unwrap();
        assert!(stmt
            .sql()
            .ends_with("WHERE lower(ranked.char_name) = lower($1) ORDER BY ranked.rank_no LIMIT 1"));
        assert_eq!(stmt.values()[0].value, SqlValue::Text("Aria".into()));
    }

    #[test]
    fn lookup_on_kind_without_lookup_column_is_rejected() {
        assert_matches!(
            compose_lookup(RankingKind::ItemPlus, "x"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn every_kind_composes_without_filters() {
        for kind in RankingKind::ALL {
            let stmt = compose(&request(kind, RankingFilters::default())).unwrap();
            assert!(!stmt.sql().contains('@'), "{kind:?} left a placeholder unbound");
        }
    }
}
