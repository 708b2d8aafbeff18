//! Per-kind ranking descriptors.
//!
//! Each [`RankingSpec`] is data only: the source select, the tie-break chain
//! the window rank is ordered by, the filters the kind accepts and the field
//! table its rows are shaped with. The composer turns a spec plus a request
//! into a statement; nothing here builds SQL strings at runtime.
//!
//! Source selects alias every output column and cast integers to `bigint`
//! and ratios to `float8`, so row decoding is uniform across kinds.

use crate::filters::{FilterClause, FilterKind};
use crate::shaper::FieldSpec;

use super::RankingKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One step of a tie-break chain, referencing a source column alias.
#[derive(Debug, Clone, Copy)]
pub struct TieBreak {
    pub column: &'static str,
    pub direction: Direction,
}

const fn desc(column: &'static str) -> TieBreak {
    TieBreak {
        column,
        direction: Direction::Desc,
    }
}

const fn asc(column: &'static str) -> TieBreak {
    TieBreak {
        column,
        direction: Direction::Asc,
    }
}

/// `SELECT ... FROM ... JOIN ...` plus fixed conditions and grouping.
#[derive(Debug, Clone, Copy)]
pub struct SourceSpec {
    pub select: &'static str,
    pub conditions: &'static [&'static str],
    pub group_by: Option<&'static str>,
}

#[derive(Debug)]
pub struct RankingSpec {
    pub kind: RankingKind,
    pub source: SourceSpec,
    /// Simplified source used when the primary query fails to execute.
    pub fallback: Option<SourceSpec>,
    /// Must end with a unique column so ranks are deterministic.
    pub tie_break: &'static [TieBreak],
    pub filters: &'static [FilterClause],
    pub fields: &'static [FieldSpec],
    /// Source column matched by single-row lookups.
    pub lookup_column: Option<&'static str>,
}

impl RankingSpec {
    pub fn accepted_filters(&self) -> Vec<FilterKind> {
        self.filters.iter().map(|c| c.filter).collect()
    }
}

// ---------------------------------------------------------------------------
// Shared fragments
// ---------------------------------------------------------------------------

const RACE: FilterClause = FilterClause {
    filter: FilterKind::Race,
    template: "c.ref_obj_id BETWEEN @race_min AND @race_max",
};

const CHAR_MIN_LEVEL: FilterClause = FilterClause {
    filter: FilterKind::MinLevel,
    template: "c.cur_level >= @min_level",
};

const GUILD_NAME: FilterClause = FilterClause {
    filter: FilterKind::Guild,
    template: "g.name ILIKE @guild_pattern",
};

const JOB_TYPE: FilterClause = FilterClause {
    filter: FilterKind::JobType,
    template: "j.job_type = @job_type",
};

const FORTRESS: FilterClause = FilterClause {
    filter: FilterKind::FortressId,
    template: "r.fortress_id = @fortress_id",
};

const CHARACTER_FILTERS: &[FilterClause] = &[RACE, CHAR_MIN_LEVEL, GUILD_NAME];

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

pub static PLAYER: RankingSpec = RankingSpec {
    kind: RankingKind::Player,
    source: SourceSpec {
        select: "SELECT c.char_id::bigint AS char_id, c.char_name16 AS char_name, \
                 c.nick_name16 AS nick_name, c.ref_obj_id::bigint AS model_id, \
                 c.cur_level::bigint AS level, c.exp_offset::bigint AS exp, \
                 c.remain_gold::bigint AS gold, j.job_type::bigint AS job_type, \
                 g.name AS guild_name \
                 FROM _char c \
                 LEFT JOIN _char_trade_conflict_job j ON j.char_id = c.char_id \
                 LEFT JOIN _guild_member gm ON gm.char_id = c.char_id \
                 LEFT JOIN _guild g ON g.id = gm.guild_id",
        conditions: &["c.deleted = 0"],
        group_by: None,
    },
    fallback: None,
    tie_break: &[desc("level"), desc("exp"), asc("char_id")],
    filters: CHARACTER_FILTERS,
    fields: &[
        FieldSpec::int("rank_no", "rank"),
        FieldSpec::int("char_id", "charId"),
        FieldSpec::text("char_name", "charName"),
        FieldSpec::text("nick_name", "nickName"),
        FieldSpec::race("model_id"),
        FieldSpec::int("level", "level"),
        FieldSpec::int("exp", "exp"),
        FieldSpec::points("gold", "gold"),
        FieldSpec::job_name("job_type"),
        FieldSpec::nullable_text("guild_name", "guildName"),
    ],
    lookup_column: Some("char_name"),
};

// ---------------------------------------------------------------------------
// Guild
// ---------------------------------------------------------------------------

const GUILD_FIELDS: &[FieldSpec] = &[
    FieldSpec::int("rank_no", "rank"),
    FieldSpec::int("guild_id", "guildId"),
    FieldSpec::text("guild_name", "guildName"),
    FieldSpec::int("guild_level", "level"),
    FieldSpec::points("gathered_sp", "gatheredSp"),
    FieldSpec::int("member_count", "memberCount"),
    FieldSpec::int("avg_level", "avgLevel"),
    FieldSpec::points("total_donation", "totalDonation"),
    FieldSpec::nullable_text("master_name", "masterName"),
];

const GUILD_FILTERS: &[FilterClause] = &[
    GUILD_NAME,
    FilterClause {
        filter: FilterKind::MinLevel,
        template: "g.lvl >= @min_level",
    },
];

pub static GUILD: RankingSpec = RankingSpec {
    kind: RankingKind::Guild,
    source: SourceSpec {
        select: "SELECT g.id::bigint AS guild_id, g.name AS guild_name, \
                 g.lvl::bigint AS guild_level, g.gathered_sp::bigint AS gathered_sp, \
                 COUNT(gm.char_id)::bigint AS member_count, \
                 COALESCE(ROUND(AVG(c.cur_level)), 0)::bigint AS avg_level, \
                 COALESCE(SUM(gm.gp_donation), 0)::bigint AS total_donation, \
                 MAX(CASE WHEN gm.member_class = 0 THEN gm.char_name END) AS master_name \
                 FROM _guild g \
                 LEFT JOIN _guild_member gm ON gm.guild_id = g.id \
                 LEFT JOIN _char c ON c.char_id = gm.char_id",
        conditions: &["g.id > 0"],
        group_by: Some("g.id, g.name, g.lvl, g.gathered_sp"),
    },
    fallback: Some(SourceSpec {
        select: "SELECT g.id::bigint AS guild_id, g.name AS guild_name, \
                 g.lvl::bigint AS guild_level, g.gathered_sp::bigint AS gathered_sp, \
                 (SELECT COUNT(*) FROM _guild_member gm WHERE gm.guild_id = g.id)::bigint \
                     AS member_count, \
                 NULL::bigint AS avg_level, NULL::bigint AS total_donation, \
                 NULL::text AS master_name \
                 FROM _guild g",
        conditions: &["g.id > 0"],
        group_by: None,
    }),
    tie_break: &[
        desc("guild_level"),
        desc("gathered_sp"),
        desc("member_count"),
        asc("guild_id"),
    ],
    filters: GUILD_FILTERS,
    fields: GUILD_FIELDS,
    lookup_column: Some("guild_name"),
};

// ---------------------------------------------------------------------------
// Honor and PvP
// ---------------------------------------------------------------------------

pub static HONOR: RankingSpec = RankingSpec {
    kind: RankingKind::Honor,
    source: SourceSpec {
        select: "SELECT c.char_id::bigint AS char_id, c.char_name16 AS char_name, \
                 c.ref_obj_id::bigint AS model_id, c.cur_level::bigint AS level, \
                 t.honor_point::bigint AS honor_points, g.name AS guild_name \
                 FROM _training_camp_member t \
                 JOIN _char c ON c.char_id = t.char_id \
                 LEFT JOIN _guild_member gm ON gm.char_id = c.char_id \
                 LEFT JOIN _guild g ON g.id = gm.guild_id",
        conditions: &["c.deleted = 0", "t.honor_point > 0"],
        group_by: None,
    },
    fallback: None,
    tie_break: &[desc("honor_points"), desc("level"), asc("char_id")],
    filters: CHARACTER_FILTERS,
    fields: &[
        FieldSpec::int("rank_no", "rank"),
        FieldSpec::int("char_id", "charId"),
        FieldSpec::text("char_name", "charName"),
        FieldSpec::race("model_id"),
        FieldSpec::int("level", "level"),
        FieldSpec::points("honor_points", "honorPoints"),
        FieldSpec::nullable_text("guild_name", "guildName"),
    ],
    lookup_column: Some("char_name"),
};

pub static PVP: RankingSpec = RankingSpec {
    kind: RankingKind::Pvp,
    source: SourceSpec {
        select: "SELECT c.char_id::bigint AS char_id, c.char_name16 AS char_name, \
                 c.ref_obj_id::bigint AS model_id, c.cur_level::bigint AS level, \
                 p.kill_count::bigint AS kills, p.death_count::bigint AS deaths, \
                 g.name AS guild_name \
                 FROM _char_pvp_stats p \
                 JOIN _char c ON c.char_id = p.char_id \
                 LEFT JOIN _guild_member gm ON gm.char_id = c.char_id \
                 LEFT JOIN _guild g ON g.id = gm.guild_id",
        conditions: &["c.deleted = 0", "p.kill_count > 0"],
        group_by: None,
    },
    fallback: None,
    tie_break: &[desc("kills"), asc("deaths"), desc("level"), asc("char_id")],
    filters: CHARACTER_FILTERS,
    fields: &[
        FieldSpec::int("rank_no", "rank"),
        FieldSpec::int("char_id", "charId"),
        FieldSpec::text("char_name", "charName"),
        FieldSpec::race("model_id"),
        FieldSpec::int("level", "level"),
        FieldSpec::int("kills", "kills"),
        FieldSpec::int("deaths", "deaths"),
        FieldSpec::nullable_text("guild_name", "guildName"),
    ],
    lookup_column: Some("char_name"),
};

// ---------------------------------------------------------------------------
// Fortress war
// ---------------------------------------------------------------------------

pub static FORTRESS_PLAYER: RankingSpec = RankingSpec {
    kind: RankingKind::FortressPlayer,
    source: SourceSpec {
        select: "SELECT c.char_id::bigint AS char_id, c.char_name16 AS char_name, \
                 c.ref_obj_id::bigint AS model_id, c.cur_level::bigint AS level, \
                 g.name AS guild_name, \
                 COALESCE(SUM(r.kill_count), 0)::bigint AS kills, \
                 COALESCE(SUM(r.death_count), 0)::bigint AS deaths \
                 FROM _siege_fortress_battle_record r \
                 JOIN _char c ON c.char_id = r.char_id \
                 LEFT JOIN _guild_member gm ON gm.char_id = c.char_id \
                 LEFT JOIN _guild g ON g.id = gm.guild_id",
        conditions: &["c.deleted = 0"],
        group_by: Some("c.char_id, c.char_name16, c.ref_obj_id, c.cur_level, g.name"),
    },
    fallback: None,
    tie_break: &[desc("kills"), asc("deaths"), desc("level"), asc("char_id")],
    filters: &[FORTRESS, RACE, GUILD_NAME],
    fields: &[
        FieldSpec::int("rank_no", "rank"),
        FieldSpec::int("char_id", "charId"),
        FieldSpec::text("char_name", "charName"),
        FieldSpec::race("model_id"),
        FieldSpec::int("level", "level"),
        FieldSpec::int("kills", "kills"),
        FieldSpec::int("deaths", "deaths"),
        FieldSpec::nullable_text("guild_name", "guildName"),
    ],
    lookup_column: Some("char_name"),
};

pub static FORTRESS_GUILD: RankingSpec = RankingSpec {
    kind: RankingKind::FortressGuild,
    source: SourceSpec {
        select: "SELECT g.id::bigint AS guild_id, g.name AS guild_name, \
                 g.lvl::bigint AS guild_level, \
                 COALESCE(SUM(r.kill_count), 0)::bigint AS kills, \
                 COALESCE(SUM(r.death_count), 0)::bigint AS deaths, \
                 (SELECT COUNT(*) FROM _siege_fortress f WHERE f.guild_id = g.id)::bigint \
                     AS fortresses_owned \
                 FROM _siege_fortress_battle_record r \
                 JOIN _guild g ON g.id = r.guild_id",
        conditions: &["g.id > 0"],
        group_by: Some("g.id, g.name, g.lvl"),
    },
    fallback: None,
    tie_break: &[
        desc("kills"),
        desc("fortresses_owned"),
        desc("guild_level"),
        asc("guild_id"),
    ],
    filters: &[FORTRESS, GUILD_NAME],
    fields: &[
        FieldSpec::int("rank_no", "rank"),
        FieldSpec::int("guild_id", "guildId"),
        FieldSpec::text("guild_name", "guildName"),
        FieldSpec::int("guild_level", "level"),
        FieldSpec::int("kills", "kills"),
        FieldSpec::int("deaths", "deaths"),
        FieldSpec::int("fortresses_owned", "fortressesOwned"),
    ],
    lookup_column: Some("guild_name"),
};

// ---------------------------------------------------------------------------
// Job (trader / hunter / thief share one source; the job type is a filter)
// ---------------------------------------------------------------------------

const JOB_SELECT: &str = "SELECT c.char_id::bigint AS char_id, c.char_name16 AS char_name, \
     c.nick_name16 AS nick_name, c.ref_obj_id::bigint AS model_id, \
     c.cur_level::bigint AS level, j.job_type::bigint AS job_type, \
     j.job_level::bigint AS job_level, j.job_exp::bigint AS job_exp, \
     j.reputation_point::bigint AS reputation, \
     COALESCE(j.kill_count, 0)::bigint AS kills, \
     COALESCE(j.death_count, 0)::bigint AS deaths, \
     CASE WHEN COALESCE(j.death_count, 0) = 0 THEN COALESCE(j.kill_count, 0)::float8 \
          ELSE j.kill_count::float8 / j.death_count::float8 END AS kd_ratio, \
     g.name AS guild_name \
     FROM _char_trade_conflict_job j \
     JOIN _char c ON c.char_id = j.char_id \
     LEFT JOIN _guild_member gm ON gm.char_id = c.char_id \
     LEFT JOIN _guild g ON g.id = gm.guild_id";

const JOB_FILTERS: &[FilterClause] = &[JOB_TYPE, RACE, CHAR_MIN_LEVEL, GUILD_NAME];

const JOB_FIELDS: &[FieldSpec] = &[
    FieldSpec::int("rank_no", "rank"),
    FieldSpec::int("char_id", "charId"),
    FieldSpec::text("char_name", "charName"),
    FieldSpec::text("nick_name", "jobAlias"),
    FieldSpec::race("model_id"),
    FieldSpec::int("level", "level"),
    FieldSpec::int("job_type", "jobType"),
    FieldSpec::job_name("job_type"),
    FieldSpec::int("job_level", "jobLevel"),
    FieldSpec::int("job_exp", "jobExp"),
    FieldSpec::points("reputation", "reputation"),
    FieldSpec::int("kills", "kills"),
    FieldSpec::int("deaths", "deaths"),
    FieldSpec::ratio("kd_ratio", "kdRatio"),
    FieldSpec::nullable_text("guild_name", "guildName"),
];

pub static JOB: RankingSpec = RankingSpec {
    kind: RankingKind::Job,
    source: SourceSpec {
        select: JOB_SELECT,
        conditions: &["c.deleted = 0"],
        group_by: None,
    },
    fallback: None,
    tie_break: &[
        desc("job_exp"),
        desc("reputation"),
        desc("job_level"),
        asc("char_id"),
    ],
    filters: JOB_FILTERS,
    fields: JOB_FIELDS,
    lookup_column: Some("char_name"),
};

/// Zero-death rows carry `kd_ratio = kills`, so they sort by raw kill count.
pub static JOB_KD: RankingSpec = RankingSpec {
    kind: RankingKind::JobKd,
    source: SourceSpec {
        select: JOB_SELECT,
        conditions: &["c.deleted = 0"],
        group_by: None,
    },
    fallback: None,
    tie_break: &[
        desc("kd_ratio"),
        desc("job_exp"),
        desc("kills"),
        desc("job_level"),
        asc("char_id"),
    ],
    filters: JOB_FILTERS,
    fields: JOB_FIELDS,
    lookup_column: Some("char_name"),
};

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// Equipment slots `0..13` are worn gear; higher slots are the bag.
pub static ITEM_PLUS: RankingSpec = RankingSpec {
    kind: RankingKind::ItemPlus,
    source: SourceSpec {
        select: "SELECT it.id64::bigint AS item_id, roc.code_name128 AS item_code, \
                 roc.obj_name128 AS item_name, roc.rarity::bigint AS rarity, \
                 it.opt_level::bigint AS plus, c.char_id::bigint AS char_id, \
                 c.char_name16 AS char_name, c.ref_obj_id::bigint AS model_id, \
                 g.name AS guild_name \
                 FROM _inventory inv \
                 JOIN _items it ON it.id64 = inv.item_id \
                 JOIN _ref_obj_common roc ON roc.id = it.ref_item_id \
                 JOIN _char c ON c.char_id = inv.char_id \
                 LEFT JOIN _guild_member gm ON gm.char_id = c.char_id \
                 LEFT JOIN _guild g ON g.id = gm.guild_id",
        conditions: &["c.deleted = 0", "inv.slot < 13", "it.opt_level > 0"],
        group_by: None,
    },
    fallback: None,
    tie_break: &[desc("plus"), desc("rarity"), asc("item_id")],
    filters: &[
        FilterClause {
            filter: FilterKind::MinPlus,
            template: "it.opt_level >= @min_plus",
        },
        RACE,
        GUILD_NAME,
    ],
    fields: &[
        FieldSpec::int("rank_no", "rank"),
        FieldSpec::int("item_id", "itemId"),
        FieldSpec::text("item_code", "itemCode"),
        FieldSpec::nullable_text("item_name", "itemName"),
        FieldSpec::int("rarity", "rarity"),
        FieldSpec::int("plus", "plus"),
        FieldSpec::int("char_id", "charId"),
        FieldSpec::text("char_name", "charName"),
        FieldSpec::race("model_id"),
        FieldSpec::nullable_text("guild_name", "guildName"),
    ],
    lookup_column: None,
};

pub static ITEM_DROP: RankingSpec = RankingSpec {
    kind: RankingKind::ItemDrop,
    source: SourceSpec {
        select: "SELECT c.char_id::bigint AS char_id, c.char_name16 AS char_name, \
                 c.ref_obj_id::bigint AS model_id, c.cur_level::bigint AS level, \
                 g.name AS guild_name, COUNT(*)::bigint AS drop_count, \
                 MAX(d.dropped_at) AS last_drop_at \
                 FROM _item_drop_log d \
                 JOIN _ref_obj_common roc ON roc.id = d.ref_item_id \
                 JOIN _char c ON c.char_id = d.char_id \
                 LEFT JOIN _guild_member gm ON gm.char_id = c.char_id \
                 LEFT JOIN _guild g ON g.id = gm.guild_id",
        conditions: &["c.deleted = 0", "roc.rarity > 0"],
        group_by: Some("c.char_id, c.char_name16, c.ref_obj_id, c.cur_level, g.name"),
    },
    fallback: None,
    tie_break: &[desc("drop_count"), asc("last_drop_at"), asc("char_id")],
    filters: CHARACTER_FILTERS,
    fields: &[
        FieldSpec::int("rank_no", "rank"),
        FieldSpec::int("char_id", "charId"),
        FieldSpec::text("char_name", "charName"),
        FieldSpec::race("model_id"),
        FieldSpec::int("level", "level"),
        FieldSpec::int("drop_count", "dropCount"),
        FieldSpec::date("last_drop_at", "lastDropAt"),
        FieldSpec::nullable_text("guild_name", "guildName"),
    ],
    lookup_column: Some("char_name"),
};

// ---------------------------------------------------------------------------
// Guild overview (singular lookup, not ranked)
// ---------------------------------------------------------------------------

pub const GUILD_OVERVIEW_FIELDS: &[FieldSpec] = &[
    FieldSpec::int("guild_id", "guildId"),
    FieldSpec::text("guild_name", "name"),
    FieldSpec::int("guild_level", "level"),
    FieldSpec::points("gathered_sp", "gatheredSp"),
    FieldSpec::int("member_count", "memberCount"),
    FieldSpec::nullable_text("master_name", "masterName"),
    FieldSpec::date("foundation_date", "foundedAt"),
];

pub const GUILD_MEMBER_FIELDS: &[FieldSpec] = &[
    FieldSpec::int("char_id", "charId"),
    FieldSpec::text("char_name", "charName"),
    FieldSpec::text("nickname", "nickName"),
    FieldSpec::race("model_id"),
    FieldSpec::int("char_level", "level"),
    FieldSpec::int("member_class", "memberClass"),
    FieldSpec::points("gp_donation", "gpDonation"),
    FieldSpec::date("join_date", "joinedAt"),
];
