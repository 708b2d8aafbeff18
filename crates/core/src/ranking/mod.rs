//! Ranking kinds, requests, cache keys and TTL configuration.

pub mod composer;
pub mod specs;

use std::time::Duration;

use serde::Serialize;

use crate::filters::RankingFilters;
use crate::pagination::Page;

pub use composer::{compose, compose_fallback, compose_lookup};
pub use specs::RankingSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RankingKind {
    Player,
    Guild,
    Honor,
    Pvp,
    FortressPlayer,
    FortressGuild,
    Job,
    JobKd,
    ItemPlus,
    ItemDrop,
}

impl RankingKind {
    pub const ALL: [RankingKind; 10] = [
        RankingKind::Player,
        RankingKind::Guild,
        RankingKind::Honor,
        RankingKind::Pvp,
        RankingKind::FortressPlayer,
        RankingKind::FortressGuild,
        RankingKind::Job,
        RankingKind::JobKd,
        RankingKind::ItemPlus,
        RankingKind::ItemDrop,
    ];

    /// URL path segment, e.g. `job-kd`.
    pub fn slug(self) -> &'static str {
        match self {
            RankingKind::Player => "player",
            RankingKind::Guild => "guild",
            RankingKind::Honor => "honor",
            RankingKind::Pvp => "pvp",
            RankingKind::FortressPlayer => "fortress-player",
            RankingKind::FortressGuild => "fortress-guild",
            RankingKind::Job => "job",
            RankingKind::JobKd => "job-kd",
            RankingKind::ItemPlus => "item-plus",
            RankingKind::ItemDrop => "item-drop",
        }
    }

    pub fn from_slug(slug: &str) -> Option<RankingKind> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }

    pub fn spec(self) -> &'static RankingSpec {
        match self {
            RankingKind::Player => &specs::PLAYER,
            RankingKind::Guild => &specs::GUILD,
            RankingKind::Honor => &specs::HONOR,
            RankingKind::Pvp => &specs::PVP,
            RankingKind::FortressPlayer => &specs::FORTRESS_PLAYER,
            RankingKind::FortressGuild => &specs::FORTRESS_GUILD,
            RankingKind::Job => &specs::JOB,
            RankingKind::JobKd => &specs::JOB_KD,
            RankingKind::ItemPlus => &specs::ITEM_PLUS,
            RankingKind::ItemDrop => &specs::ITEM_DROP,
        }
    }
}

/// A fully parsed ranking request.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingRequest {
    pub kind: RankingKind,
    pub page: Page,
    pub filters: RankingFilters,
}

impl RankingRequest {
    pub fn new(kind: RankingKind, page: Page, filters: RankingFilters) -> Self {
        Self {
            kind,
            page,
            filters,
        }
    }

    /// Cache key covering every input that changes the result.
    ///
    /// `ranking:<kind>:limit=<n>:offset=<n>[:<filter>=<value>...]`, filters in
    /// a fixed order and values escaped so no value can forge a separator.
    pub fn cache_key(&self) -> String {
        let mut key = format!(
            "ranking:{}:limit={}:offset={}",
            self.kind.slug(),
            self.page.limit,
            self.page.offset
        );
        for (name, value) in self.filters.key_parts() {
            key.push(':');
            key.push_str(name);
            key.push('=');
            key.push_str(&escape_key_value(&value));
        }
        key
    }
}

/// Cache key for a single-row lookup within a ranking.
pub fn lookup_cache_key(kind: RankingKind, name: &str) -> String {
    format!(
        "ranking:{}:lookup={}",
        kind.slug(),
        escape_key_value(&name.to_lowercase())
    )
}

/// Cache key for a guild overview.
pub fn guild_overview_cache_key(name: &str) -> String {
    format!("guild:overview:{}", escape_key_value(&name.to_lowercase()))
}

fn escape_key_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            '=' => out.push_str("%3D"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// TTL configuration
// ---------------------------------------------------------------------------

/// Cache TTLs per ranking kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    ttls: Vec<(RankingKind, Duration)>,
    pub guild_overview_ttl: Duration,
}

impl Default for RankingConfig {
    fn default() -> Self {
        let ttls = RankingKind::ALL
            .into_iter()
            .map(|kind| (kind, Duration::from_secs(default_ttl_secs(kind))))
            .collect();
        Self {
            ttls,
            guild_overview_ttl: Duration::from_secs(120),
        }
    }
}

/// Aggregate-heavy kinds are cached longer.
fn default_ttl_secs(kind: RankingKind) -> u64 {
    match kind {
        RankingKind::Player | RankingKind::Job | RankingKind::JobKd => 300,
        RankingKind::Guild | RankingKind::FortressPlayer | RankingKind::FortressGuild => 600,
        RankingKind::Honor | RankingKind::ItemPlus | RankingKind::ItemDrop => 900,
        RankingKind::Pvp => 120,
    }
}

impl RankingConfig {
    pub fn ttl(&self, kind: RankingKind) -> Duration {
        self.ttls
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, ttl)| *ttl)
            .unwrap_or_else(|| Duration::from_secs(default_ttl_secs(kind)))
    }

    pub fn set_ttl(&mut self, kind: RankingKind, ttl: Duration) {
        match self.ttls.iter_mut().find(|(k, _)| *k == kind) {
            Some(entry) => entry.1 = ttl,
            None => self.ttls.push((kind, ttl)),
        }
    }

    /// Environment variable overriding the TTL for `kind`,
    /// e.g. `RANKING_TTL_JOB_KD_SECS`.
    pub fn env_var(kind: RankingKind) -> String {
        format!(
            "RANKING_TTL_{}_SECS",
            kind.slug().replace('-', "_").to_uppercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{JobType, Race};

    #[test]
    fn slugs_round_trip_for_every_kind() {
        for kind in RankingKind::ALL {
            assert_eq!(RankingKind::from_slug(kind.slug()), Some(kind));
            assert_eq!(kind.spec().kind, kind);
        }
        assert_eq!(RankingKind::from_slug("unknown"), None);
    }

    #[test]
    fn every_tie_break_chain_ends_with_a_unique_column() {
        for kind in RankingKind::ALL {
            let last = kind.spec().tie_break.last().unwrap();
            assert!(
                ["char_id", "guild_id", "item_id"].contains(&last.column),
                "{kind:?} ends its chain with {}",
                last.column
            );
        }
    }

    #[test]
    fn cache_key_includes_every_active_parameter() {
        let request = RankingRequest::new(
            RankingKind::JobKd,
            Page {
                limit: 10,
                offset: 20,
            },
            RankingFilters {
                job_type: Some(JobType(1)),
                race: Some(Race::Chinese),
                ..Default::default()
            },
        );
        assert_eq!(
            request.cache_key(),
            "ranking:job-kd:limit=10:offset=20:race=ch:jobType=1"
        );
    }

    #[test]
    fn distinct_requests_never_share_a_key() {
        let base = RankingRequest::new(RankingKind::Player, Page::default(), Default::default());
        let mut other_page = base.clone();
        other_page.page.offset = 100;
        let mut other_kind = base.clone();
        other_kind.kind = RankingKind::Honor;
        let mut filtered = base.clone();
        filtered.filters.min_level = Some(90);

        let keys = [
            base.cache_key(),
            other_page.cache_key(),
            other_kind.cache_key(),
            filtered.cache_key(),
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(base.cache_key(), base.clone().cache_key());
    }

    #[test]
    fn separators_in_filter_values_are_escaped() {
        let request = RankingRequest::new(
            RankingKind::Player,
            Page::default(),
            RankingFilters {
                guild: Some("x:limit=1".into()),
                ..Default::default()
            },
        );
        assert_eq!(
            request.cache_key(),
            "ranking:player:limit=100:offset=0:guild=x%3Alimit%3D1"
        );
    }

    #[test]
    fn ttl_overrides_apply_per_kind() {
        let mut config = RankingConfig::default();
        assert_eq!(config.ttl(RankingKind::Pvp), Duration::from_secs(120));

        config.set_ttl(RankingKind::Pvp, Duration::from_secs(5));
        assert_eq!(config.ttl(RankingKind::Pvp), Duration::from_secs(5));
        assert_eq!(config.ttl(RankingKind::Player), Duration::from_secs(300));
        assert_eq!(
            RankingConfig::env_var(RankingKind::FortressGuild),
            "RANKING_TTL_FORTRESS_GUILD_SECS"
        );
    }
}
