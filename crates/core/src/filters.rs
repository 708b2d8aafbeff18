//! Ranking filters and the clause builder that turns them into SQL.
//!
//! Filters arrive as raw query-string values. [`RankingFilters::parse`]
//! converts and validates them, failing fast with a descriptive
//! [`CoreError::Validation`] instead of ignoring a bad value. The
//! [`FilterBuilder`] then accumulates `(clause, params)` pairs; an absent
//! filter contributes nothing, not even an always-true clause.

use serde::Serialize;
use validator::Validate;

use crate::binder::{Params, SqlType};
use crate::error::CoreError;
use crate::game::{job_codes_display, JobType, Race};

/// Filter values exactly as received from the query string.
#[derive(Debug, Clone, Default)]
pub struct RawFilters {
    pub race: Option<String>,
    pub min_level: Option<String>,
    pub guild: Option<String>,
    pub job_type: Option<String>,
    pub fortress_id: Option<String>,
    pub min_plus: Option<String>,
}

/// The filters a ranking kind can accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FilterKind {
    Race,
    MinLevel,
    Guild,
    JobType,
    FortressId,
    MinPlus,
}

impl FilterKind {
    /// Query-string parameter name.
    pub fn param_name(self) -> &'static str {
        match self {
            FilterKind::Race => "race",
            FilterKind::MinLevel => "minLevel",
            FilterKind::Guild => "guild",
            FilterKind::JobType => "jobType",
            FilterKind::FortressId => "fortressId",
            FilterKind::MinPlus => "minPlus",
        }
    }
}

/// Parsed and validated filters. `None` means the filter is inactive.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct RankingFilters {
    pub race: Option<Race>,
    #[validate(range(min = 1, max = 140, message = "minLevel must be between 1 and 140"))]
    pub min_level: Option<i32>,
    #[validate(length(min = 1, max = 64, message = "guild must be at most 64 characters"))]
    pub guild: Option<String>,
    pub job_type: Option<JobType>,
    #[validate(range(min = 1, message = "fortressId must be a positive id"))]
    pub fortress_id: Option<i32>,
    #[validate(range(min = 0, max = 255, message = "minPlus must be between 0 and 255"))]
    pub min_plus: Option<i32>,
}

impl RankingFilters {
    pub fn parse(raw: &RawFilters) -> Result<Self, CoreError> {
        let race = match non_empty(&raw.race) {
            Some(v) => Some(Race::parse(v).ok_or_else(|| {
                CoreError::Validation(format!("race must be one of ch, eu (got '{v}')"))
            })?),
            None => None,
        };

        let job_type = match non_empty(&raw.job_type) {
            Some(v) => {
                let code = parse_int(FilterKind::JobType, v)?;
                Some(JobType::from_code(code).ok_or_else(|| {
                    CoreError::Validation(format!(
                        "jobType must be one of {} (got {code})",
                        job_codes_display()
                    ))
                })?)
            }
            None => None,
        };

        let filters = Self {
            race,
            min_level: non_empty(&raw.min_level)
                .map(|v| parse_int(FilterKind::MinLevel, v))
                .transpose()?,
            guild: non_empty(&raw.guild).map(str::to_string),
            job_type,
            fortress_id: non_empty(&raw.fortress_id)
                .map(|v| parse_int(FilterKind::FortressId, v))
                .transpose()?,
            min_plus: non_empty(&raw.min_plus)
                .map(|v| parse_int(FilterKind::MinPlus, v))
                .transpose()?,
        };

        filters.validate().map_err(describe_validation)?;
        Ok(filters)
    }

    /// Kinds of the filters that are set, in declaration order.
    pub fn active(&self) -> Vec<FilterKind> {
        let mut kinds = Vec::new();
        if self.race.is_some() {
            kinds.push(FilterKind::Race);
        }
        if self.min_level.is_some() {
            kinds.push(FilterKind::MinLevel);
        }
        if self.guild.is_some() {
            kinds.push(FilterKind::Guild);
        }
        if self.job_type.is_some() {
            kinds.push(FilterKind::JobType);
        }
        if self.fortress_id.is_some() {
            kinds.push(FilterKind::FortressId);
        }
        if self.min_plus.is_some() {
            kinds.push(FilterKind::MinPlus);
        }
        kinds
    }

    /// `(name, value)` pairs for every active filter, in a fixed order.
    ///
    /// Used to build cache keys, so two equal filter sets always produce the
    /// same pairs.
    pub fn key_parts(&self) -> Vec<(&'static str, String)> {
        let mut parts = Vec::new();
        if let Some(race) = self.race {
            parts.push((FilterKind::Race.param_name(), race.entry().code.to_string()));
        }
        if let Some(v) = self.min_level {
            parts.push((FilterKind::MinLevel.param_name(), v.to_string()));
        }
        if let Some(v) = &self.guild {
            parts.push((FilterKind::Guild.param_name(), v.to_lowercase()));
        }
        if let Some(v) = self.job_type {
            parts.push((FilterKind::JobType.param_name(), v.code().to_string()));
        }
        if let Some(v) = self.fortress_id {
            parts.push((FilterKind::FortressId.param_name(), v.to_string()));
        }
        if let Some(v) = self.min_plus {
            parts.push((FilterKind::MinPlus.param_name(), v.to_string()));
        }
        parts
    }

    /// Reject any active filter the ranking kind does not declare.
    pub fn ensure_only(&self, accepted: &[FilterKind], kind_name: &str) -> Result<(), CoreError> {
        match self.active().into_iter().find(|k| !accepted.contains(k)) {
            Some(unsupported) => Err(CoreError::Validation(format!(
                "{} is not a supported filter for the {kind_name} ranking",
                unsupported.param_name()
            ))),
            None => Ok(()),
        }
    }
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_int(kind: FilterKind, raw: &str) -> Result<i32, CoreError> {
    raw.parse::<i32>().map_err(|_| {
        CoreError::Validation(format!("{} must be an integer (got '{raw}')", kind.param_name()))
    })
}

fn describe_validation(errors: validator::ValidationErrors) -> CoreError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .collect();
    messages.sort();
    CoreError::Validation(messages.join("; "))
}

/// Escape `%`, `_` and `\` so user text matches literally inside `LIKE`.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Clause builder
// ---------------------------------------------------------------------------

/// SQL template for one filter on one ranking kind.
///
/// Each template references the parameters its filter binds:
///
/// | filter     | parameters               |
/// |------------|--------------------------|
/// | Race       | `@race_min`, `@race_max` |
/// | MinLevel   | `@min_level`             |
/// | Guild      | `@guild_pattern`         |
/// | JobType    | `@job_type`              |
/// | FortressId | `@fortress_id`           |
/// | MinPlus    | `@min_plus`              |
#[derive(Debug, Clone, Copy)]
pub struct FilterClause {
    pub filter: FilterKind,
    pub template: &'static str,
}

/// Accumulates WHERE fragments with their bound parameters.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    clauses: Vec<(String, Params)>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fixed condition that binds nothing.
    pub fn push_static(&mut self, clause: &str) {
        self.clauses.push((clause.to_string(), Params::new()));
    }

    pub fn push(&mut self, clause: &str, params: Params) {
        self.clauses.push((clause.to_string(), params));
    }

    /// Add the clause for every active filter using the kind's templates.
    pub fn push_filters(
        &mut self,
        filters: &RankingFilters,
        templates: &[FilterClause],
    ) -> Result<(), CoreError> {
        for clause in templates {
            let mut params = Params::new();
            let active = match clause.filter {
                FilterKind::Race => filters.race.map(|race| {
                    let entry = race.entry();
                    params
                        .input("race_min", SqlType::Int, entry.min_model_id)
                        .and_then(|p| p.input("race_max", SqlType::Int, entry.max_model_id))
                        .map(|_| ())
                }),
                FilterKind::MinLevel => filters
                    .min_level
                    .map(|v| params.input("min_level", SqlType::Int, v).map(|_| ())),
                FilterKind::Guild => filters.guild.as_deref().map(|v| {
                    let pattern = format!("%{}%", escape_like(v));
                    params.input("guild_pattern", SqlType::Text, pattern).map(|_| ())
                }),
                FilterKind::JobType => filters
                    .job_type
                    .map(|v| params.input("job_type", SqlType::Int, v.code()).map(|_| ())),
                FilterKind::FortressId => filters
                    .fortress_id
                    .map(|v| params.input("fortress_id", SqlType::Int, v).map(|_| ())),
                FilterKind::MinPlus => filters
                    .min_plus
                    .map(|v| params.input("min_plus", SqlType::Int, v).map(|_| ())),
            };
            if let Some(bound) = active {
                bound?;
                self.push(clause.template, params);
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Join the clauses into a `WHERE ...` string (empty if none) and merge
    /// their parameters.
    pub fn build(self) -> Result<(String, Params), CoreError> {
        let mut params = Params::new();
        let mut texts = Vec::with_capacity(self.clauses.len());
        for (clause, clause_params) in self.clauses {
            params.extend(clause_params)?;
            texts.push(clause);
        }
        let where_clause = if texts.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", texts.join(" AND "))
        };
        Ok((where_clause, params))
    }
}
