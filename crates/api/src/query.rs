//! Query-string parameters for ranking endpoints.
//!
//! Every field is taken as a raw string so malformed input never fails
//! extraction; pagination is clamped in `sro_core::pagination` and filters are
//! validated by `RankingFilters::parse`. A repeated key keeps its first value
//! and unknown keys are ignored.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use sro_core::error::CoreError;
use sro_core::filters::{RankingFilters, RawFilters};
use sro_core::pagination::Page;
use sro_core::ranking::{RankingKind, RankingRequest};

use crate::error::AppError;

/// `?limit=&offset=` plus every ranking filter.
#[derive(Debug, Default)]
pub struct RankingQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub race: Option<String>,
    pub min_level: Option<String>,
    pub guild: Option<String>,
    pub job_type: Option<String>,
    pub fortress_id: Option<String>,
    pub min_plus: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for RankingQuery {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self::from_pairs(pairs))
    }
}

impl RankingQuery {
    /// Build from decoded `key=value` pairs in request order.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "limit" => &mut query.limit,
                "offset" => &mut query.offset,
                "race" => &mut query.race,
                "minLevel" => &mut query.min_level,
                "guild" => &mut query.guild,
                "jobType" => &mut query.job_type,
                "fortressId" => &mut query.fortress_id,
                "minPlus" => &mut query.min_plus,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    pub fn page(&self) -> Page {
        Page::from_raw(self.limit.as_deref(), self.offset.as_deref())
    }

    pub fn raw_filters(&self) -> RawFilters {
        RawFilters {
            race: self.race.clone(),
            min_level: self.min_level.clone(),
            guild: self.guild.clone(),
            job_type: self.job_type.clone(),
            fortress_id: self.fortress_id.clone(),
            min_plus: self.min_plus.clone(),
        }
    }

    /// Parse into a request for `kind`, failing on an invalid filter value.
    pub fn into_request(self, kind: RankingKind) -> Result<RankingRequest, CoreError> {
        let filters = RankingFilters::parse(&self.raw_filters())?;
        Ok(RankingRequest::new(kind, self.page(), filters))
    }
}
