//! Seed helpers for db integration tests.

#![allow(dead_code)]

use std::time::Duration;

use sqlx::PgPool;

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub const CH_MODEL: i32 = 1907;
pub const EU_MODEL: i32 = 14875;

pub async fn insert_char(pool: &PgPool, id: i32, name: &str, model: i32, level: i16, exp: i64) {
    sqlx::query(
        "INSERT INTO _char (char_id, char_name16, nick_name16, ref_obj_id, cur_level, max_level, exp_offset) \
         VALUES ($1, $2, $3, $4, $5, $5, $6)",
    )
    .bind(id)
    .bind(name)
    .bind(format!("{name}_nick"))
    .bind(model)
    .bind(level)
    .bind(exp)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn delete_char(pool: &PgPool, id: i32) {
    sqlx::query("UPDATE _char SET deleted = 1 WHERE char_id = $1")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_job(pool: &PgPool, char_id: i32, job_type: i16, job_exp: i32, kills: i32, deaths: i32) {
    sqlx::query(
        "INSERT INTO _char_trade_conflict_job \
         (char_id, job_type, job_level, job_exp, reputation_point, kill_count, death_count) \
         VALUES ($1, $2, 1, $3, 0, $4, $5)",
    )
    .bind(char_id)
    .bind(job_type)
    .bind(job_exp)
    .bind(kills)
    .bind(deaths)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_guild(pool: &PgPool, id: i32, name: &str, lvl: i16, sp: i32) {
    sqlx::query(
        "INSERT INTO _guild (id, name, lvl, gathered_sp, foundation_date) \
         VALUES ($1, $2, $3, $4, '2023-05-17T12:00:00Z')",
    )
    .bind(id)
    .bind(name)
    .bind(lvl)
    .bind(sp)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn add_member(pool: &PgPool, guild_id: i32, char_id: i32, name: &str, class: i16) {
    sqlx::query(
        "INSERT INTO _guild_member (guild_id, char_id, char_name, member_class, char_level, gp_donation) \
         VALUES ($1, $2, $3, $4, 1, 1500)",
    )
    .bind(guild_id)
    .bind(char_id)
    .bind(name)
    .bind(class)
    .execute(pool)
    .await
    .unwrap();
}

/// Insert `count` characters named `Player01..` with strictly decreasing level.
pub async fn seed_players(pool: &PgPool, count: i32) {
    for i in 1..=count {
        let level = (120 - i) as i16;
        insert_char(pool, i, &format!("Player{i:02}"), CH_MODEL, level, 1_000).await;
    }
}

pub async fn insert_honor(pool: &PgPool, char_id: i32, honor: i32) {
    sqlx::query("INSERT INTO _training_camp_member (char_id, honor_point) VALUES ($1, $2)")
        .bind(char_id)
        .bind(honor)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_pvp(pool: &PgPool, char_id: i32, kills: i32, deaths: i32) {
    sqlx::query("INSERT INTO _char_pvp_stats (char_id, kill_count, death_count) VALUES ($1, $2, $3)")
        .bind(char_id)
        .bind(kills)
        .bind(deaths)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_fortress(pool: &PgPool, fortress_id: i32, owner_guild_id: i32) {
    sqlx::query("INSERT INTO _siege_fortress (fortress_id, guild_id) VALUES ($1, $2)")
        .bind(fortress_id)
        .bind(owner_guild_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn insert_battle(
    pool: &PgPool,
    fortress_id: i32,
    char_id: i32,
    guild_id: i32,
    kills: i32,
    deaths: i32,
) {
    sqlx::query(
        "INSERT INTO _siege_fortress_battle_record \
         (fortress_id, char_id, guild_id, kill_count, death_count) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(fortress_id)
    .bind(char_id)
    .bind(guild_id)
    .bind(kills)
    .bind(deaths)
    .execute(pool)
    .await
    .unwrap();
}

pub async fn insert_ref_item(pool: &PgPool, id: i32, code: &str, rarity: i16) {
    sqlx::query(
        "INSERT INTO _ref_obj_common (id, code_name128, obj_name128, rarity) VALUES ($1, $2, $2, $3)",
    )
    .bind(id)
    .bind(code)
    .bind(rarity)
    .execute(pool)
    .await
    .unwrap();
}

/// Create item `item_id` from `ref_id` at `plus` and place it in `slot` of `char_id`.
pub async fn give_item(pool: &PgPool, char_id: i32, slot: i16, item_id: i64, ref_id: i32, plus: i16) {
    sqlx::query("INSERT INTO _items (id64, ref_item_id, opt_level) VALUES ($1, $2, $3)")
        .bind(item_id)
        .bind(ref_id)
        .bind(plus)
        .execute(pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO _inventory (char_id, slot, item_id) VALUES ($1, $2, $3)")
        .bind(char_id)
        .bind(slot)
        .bind(item_id)
        .execute(pool)
        .await
        .unwrap();
}

/// Log a drop of `ref_id` for `char_id`; `at` is an RFC 3339 timestamp.
pub async fn insert_drop(pool: &PgPool, char_id: i32, ref_id: i32, at: &str) {
    sqlx::query(
        "INSERT INTO _item_drop_log (char_id, ref_item_id, dropped_at) VALUES ($1, $2, $3::timestamptz)",
    )
    .bind(char_id)
    .bind(ref_id)
    .bind(at)
    .execute(pool)
    .await
    .unwrap();
}
