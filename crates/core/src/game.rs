//! Static lookup tables for game codes.
//!
//! Race is derived from the character model id (`_char.ref_obj_id`); job
//! types are the codes stored in `_char_trade_conflict_job.job_type`. Servers
//! that renumber job types edit [`JOB_TYPES`] and nothing else.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Races
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Race {
    Chinese,
    European,
}

/// A race together with the inclusive model id range that identifies it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RaceEntry {
    pub race: Race,
    pub code: &'static str,
    pub name: &'static str,
    pub min_model_id: i32,
    pub max_model_id: i32,
}

pub const RACES: &[RaceEntry] = &[
    RaceEntry {
        race: Race::Chinese,
        code: "ch",
        name: "Chinese",
        min_model_id: 1907,
        max_model_id: 1932,
    },
    RaceEntry {
        race: Race::European,
        code: "eu",
        name: "European",
        min_model_id: 14875,
        max_model_id: 14900,
    },
];

/// Display name used when a model id falls outside every known range.
pub const UNKNOWN_RACE: &str = "Unknown";

impl Race {
    pub fn entry(self) -> &'static RaceEntry {
        RACES
            .iter()
            .find(|e| e.race == self)
            .unwrap_or(&RACES[0])
    }

    /// Parse a race filter value (`ch`, `eu`, or the display name).
    pub fn parse(raw: &str) -> Option<Race> {
        let raw = raw.trim();
        RACES
            .iter()
            .find(|e| e.code.eq_ignore_ascii_case(raw) || e.name.eq_ignore_ascii_case(raw))
            .map(|e| e.race)
    }

    pub fn from_model_id(model_id: i64) -> Option<Race> {
        RACES
            .iter()
            .find(|e| (e.min_model_id as i64..=e.max_model_id as i64).contains(&model_id))
            .map(|e| e.race)
    }
}

/// Race display name for a model id, or [`UNKNOWN_RACE`].
pub fn race_name(model_id: i64) -> &'static str {
    Race::from_model_id(model_id)
        .map(|r| r.entry().name)
        .unwrap_or(UNKNOWN_RACE)
}

// ---------------------------------------------------------------------------
// Job types
// ---------------------------------------------------------------------------

/// A job type code as stored in the game database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct JobType(pub i32);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct JobEntry {
    pub code: i32,
    pub slug: &'static str,
    pub name: &'static str,
}

pub const JOB_TYPES: &[JobEntry] = &[
    JobEntry {
        code: 0,
        slug: "trader",
        name: "Trader",
    },
    JobEntry {
        code: 1,
        slug: "hunter",
        name: "Hunter",
    },
    JobEntry {
        code: 2,
        slug: "thief",
        name: "Thief",
    },
];

/// Display name used for a job code missing from [`JOB_TYPES`].
pub const UNKNOWN_JOB: &str = "None";

impl JobType {
    /// Accept a code only if it is listed in [`JOB_TYPES`].
    pub fn from_code(code: i32) -> Option<JobType> {
        JOB_TYPES.iter().any(|e| e.code == code).then_some(JobType(code))
    }

    pub fn from_slug(slug: &str) -> Option<JobType> {
        JOB_TYPES
            .iter()
            .find(|e| e.slug.eq_ignore_ascii_case(slug.trim()))
            .map(|e| JobType(e.code))
    }

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn name(self) -> &'static str {
        job_name(self.0 as i64)
    }
}

pub fn job_name(code: i64) -> &'static str {
    JOB_TYPES
        .iter()
        .find(|e| e.code as i64 == code)
        .map(|e| e.name)
        .unwrap_or(UNKNOWN_JOB)
}

/// Comma-separated list of valid job codes, for error messages.
pub fn job_codes_display() -> String {
    JOB_TYPES
        .iter()
        .map(|e| format!("{}={}", e.code, e.name))
        .collect::<Vec<_>>()
        .join(", ")
}
