//! Repository for the guild overview page.

use std::time::Duration;

use sqlx::PgPool;
use sro_core::binder::{Params, SqlType, Statement};
use sro_core::error::CoreError;
use sro_core::ranking::specs::{GUILD_MEMBER_FIELDS, GUILD_OVERVIEW_FIELDS};
use sro_core::shaper::{shape_row, shape_rows, RowSource, ShapedRow};

use crate::executor::{fetch_all, fetch_optional};
use crate::DbError;

const GUILD_BY_NAME: &str = "SELECT g.id::bigint AS guild_id, g.name AS guild_name, \
     g.lvl::bigint AS guild_level, g.gathered_sp::bigint AS gathered_sp, \
     g.foundation_date AS foundation_date, \
     (SELECT COUNT(*) FROM _guild_member gm WHERE gm.guild_id = g.id)::bigint AS member_count, \
     (SELECT gm.char_name FROM _guild_member gm \
       WHERE gm.guild_id = g.id AND gm.member_class = 0 LIMIT 1) AS master_name \
     FROM _guild g \
     WHERE g.id > 0 AND lower(g.name) = lower(@guild_name) \
     ORDER BY g.id LIMIT 1";

const GUILD_MEMBERS: &str = "SELECT gm.char_id::bigint AS char_id, gm.char_name AS char_name, \
     gm.nickname AS nickname, c.ref_obj_id::bigint AS model_id, \
     COALESCE(c.cur_level, gm.char_level)::bigint AS char_level, \
     gm.member_class::bigint AS member_class, gm.gp_donation::bigint AS gp_donation, \
     gm.join_date AS join_date \
     FROM _guild_member gm \
     LEFT JOIN _char c ON c.char_id = gm.char_id \
     WHERE gm.guild_id = @guild_id \
     ORDER BY gm.member_class ASC, char_level DESC, gm.char_name ASC";

/// A guild and its roster, shaped for the frontend.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct GuildOverview {
    pub guild: ShapedRow,
    pub members: Vec<ShapedRow>,
}

/// Provides read operations for guild detail pages.
pub struct GuildRepo;

impl GuildRepo {
    /// Look up a guild by exact (case-insensitive) name with its members.
    ///
    /// Returns `None` when no guild has that name.
    pub async fn overview(
        pool: &PgPool,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<GuildOverview>, DbError> {
        let mut params = Params::new();
        params.input("guild_name", SqlType::Text, name.trim())?;
        let stmt = Statement::prepare(GUILD_BY_NAME, &params)?;

        let Some(row) = fetch_optional(pool, &stmt, timeout).await? else {
            return Ok(None);
        };

        let guild_id = row.int("guild_id")?.ok_or_else(|| CoreError::Shape {
            column: "guild_id".into(),
            reason: "guild row without id".into(),
        })?;
        let guild = shape_row(&row, GUILD_OVERVIEW_FIELDS)?;

        let mut params = Params::new();
        params.input("guild_id", SqlType::BigInt, guild_id)?;
        let stmt = Statement::prepare(GUILD_MEMBERS, &params)?;
        let members = shape_rows(&fetch_all(pool, &stmt, timeout).await?, GUILD_MEMBER_FIELDS)?;

        Ok(Some(GuildOverview { guild, members }))
    }
}
