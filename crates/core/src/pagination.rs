//! Pagination parsing for ranking endpoints.
//!
//! Bad pagination input is never an error: anything that does not parse or
//! falls outside the accepted range is replaced by the default.

use serde::Serialize;

/// Default page size.
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 1000;

pub const DEFAULT_OFFSET: i64 = 0;

/// A validated page window. `limit` is in `1..=MAX_LIMIT`, `offset >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl Page {
    /// Build a page from raw query-string values.
    pub fn from_raw(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self {
            limit: parse_limit(limit),
            offset: parse_offset(offset),
        }
    }

    /// Last rank included in this page.
    pub fn upper_rank(&self) -> i64 {
        self.offset.saturating_add(self.limit)
    }
}

/// Parse a `limit` value.
///
/// Non-numeric or non-positive input yields [`DEFAULT_LIMIT`]; values above
/// [`MAX_LIMIT`] are capped.
pub fn parse_limit(raw: Option<&str>) -> i64 {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) if n >= 1 => n.min(MAX_LIMIT),
        _ => DEFAULT_LIMIT,
    }
}

/// Parse an `offset` value.
///
/// Negative offsets are floored to zero; non-numeric input yields
/// [`DEFAULT_OFFSET`].
pub fn parse_offset(raw: Option<&str>) -> i64 {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(n) => n.max(0),
        None => DEFAULT_OFFSET,
    }
}
