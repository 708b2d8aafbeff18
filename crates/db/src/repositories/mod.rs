//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async read methods
//! that accept `&PgPool` as the first argument and a per-query timeout.

pub mod guild_repo;
pub mod ranking_repo;

pub use guild_repo::{GuildOverview, GuildRepo};
pub use ranking_repo::RankingRepo;
