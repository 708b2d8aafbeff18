//! Declarative row-to-JSON shaping.
//!
//! Every ranking kind describes its output as a table of [`FieldSpec`]s
//! (column -> output key -> kind/default). [`shape_rows`] runs any row
//! source through such a table, so null-coalescing, code lookups and number
//! formatting behave the same for every endpoint.

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};

use crate::error::CoreError;
use crate::game::{job_name, race_name};

/// A shaped output row.
pub type ShapedRow = Map<String, Value>;

/// Typed, nullable column access over a result row.
pub trait RowSource {
    fn int(&self, column: &str) -> Result<Option<i64>, CoreError>;
    fn float(&self, column: &str) -> Result<Option<f64>, CoreError>;
    fn text(&self, column: &str) -> Result<Option<String>, CoreError>;
    fn timestamp(&self, column: &str) -> Result<Option<DateTime<Utc>>, CoreError>;
}

/// What a missing text column becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDefault {
    Null,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    /// Integer, null coalesced to `default`. Never formatted.
    Int { default: i64 },
    /// Float rounded to `decimals`, null coalesced to `default`.
    Float { default: f64, decimals: u32 },
    Text(TextDefault),
    /// Currency or point total rendered with thousands separators.
    Points,
    /// Character model id resolved to a race name.
    Race,
    /// Job type code resolved to a job name.
    JobName,
    /// Timestamp rendered as `YYYY-MM-DD`, null stays null.
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub column: &'static str,
    pub key: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn int(column: &'static str, key: &'static str) -> Self {
        Self {
            column,
            key,
            kind: FieldKind::Int { default: 0 },
        }
    }

    pub const fn ratio(column: &'static str, key: &'static str) -> Self {
        Self {
            column,
            key,
            kind: FieldKind::Float {
                default: 0.0,
                decimals: 2,
            },
        }
    }

    pub const fn text(column: &'static str, key: &'static str) -> Self {
        Self {
            column,
            key,
            kind: FieldKind::Text(TextDefault::Empty),
        }
    }

    pub const fn nullable_text(column: &'static str, key: &'static str) -> Self {
        Self {
            column,
            key,
            kind: FieldKind::Text(TextDefault::Null),
        }
    }

    pub const fn points(column: &'static str, key: &'static str) -> Self {
        Self {
            column,
            key,
            kind: FieldKind::Points,
        }
    }

    pub const fn race(column: &'static str) -> Self {
        Self {
            column,
            key: "race",
            kind: FieldKind::Race,
        }
    }

    pub const fn job_name(column: &'static str) -> Self {
        Self {
            column,
            key: "jobName",
            kind: FieldKind::JobName,
        }
    }

    pub const fn date(column: &'static str, key: &'static str) -> Self {
        Self {
            column,
            key,
            kind: FieldKind::Date,
        }
    }

    fn value_from<R: RowSource + ?Sized>(&self, row: &R) -> Result<Value, CoreError> {
        let value = match self.kind {
            FieldKind::Int { default } => Value::from(row.int(self.column)?.unwrap_or(default)),
            FieldKind::Float { default, decimals } => {
                let raw = row.float(self.column)?.unwrap_or(default);
                float_value(round_to(raw, decimals))
            }
            FieldKind::Text(default) => match (row.text(self.column)?, default) {
                (Some(s), _) => Value::String(s),
                (None, TextDefault::Empty) => Value::String(String::new()),
                (None, TextDefault::Null) => Value::Null,
            },
            FieldKind::Points => {
                Value::String(format_thousands(row.int(self.column)?.unwrap_or(0)))
            }
            FieldKind::Race => Value::from(race_name(row.int(self.column)?.unwrap_or(0))),
            FieldKind::JobName => match row.int(self.column)? {
                Some(code) => Value::from(job_name(code)),
                None => Value::from(crate::game::UNKNOWN_JOB),
            },
            FieldKind::Date => match row.timestamp(self.column)? {
                Some(ts) => Value::String(ts.format("%Y-%m-%d").to_string()),
                None => Value::Null,
            },
        };
        Ok(value)
    }
}

/// Shape one row through a field table.
pub fn shape_row<R: RowSource + ?Sized>(row: &R, fields: &[FieldSpec]) -> Result<ShapedRow, CoreError> {
    let mut out = Map::with_capacity(fields.len());
    for field in fields {
        out.insert(field.key.to_string(), field.value_from(row)?);
    }
    Ok(out)
}

pub fn shape_rows<R: RowSource>(rows: &[R], fields: &[FieldSpec]) -> Result<Vec<ShapedRow>, CoreError> {
    rows.iter().map(|row| shape_row(row, fields)).collect()
}

/// Format an integer with `,` thousands separators.
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

fn float_value(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}
