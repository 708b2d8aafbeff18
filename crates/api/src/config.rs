use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use sro_core::ranking::{RankingConfig, RankingKind};

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value '{value}'")]
    Invalid { var: String, value: String },
}

/// Server configuration loaded from environment variables.
///
/// Everything except `DATABASE_URL` has a default suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Game database connection string.
    pub database_url: String,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<HeaderValue>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Per-statement database timeout in seconds (default: `10`).
    pub query_timeout_secs: u64,
    /// Pool size (default: `20`).
    pub db_max_connections: u32,
    /// Cache TTLs per ranking kind.
    pub ranking: RankingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                  |
    /// |---------------------------|--------------------------|
    /// | `DATABASE_URL`            | required                 |
    /// | `HOST`                    | `0.0.0.0`                |
    /// | `PORT`                    | `3000`                   |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                     |
    /// | `QUERY_TIMEOUT_SECS`      | `10`                     |
    /// | `DB_MAX_CONNECTIONS`      | `20`                     |
    /// | `RANKING_TTL_<KIND>_SECS` | see [`RankingConfig`]    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| ConfigError::Invalid {
                    var: "CORS_ORIGINS".into(),
                    value: origin.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut ranking = RankingConfig::default();
        for kind in RankingKind::ALL {
            let var = RankingConfig::env_var(kind);
            if let Some(secs) = optional_var::<u64>(&var)? {
                ranking.set_ttl(kind, Duration::from_secs(secs));
            }
        }

        Ok(Self {
            database_url,
            host,
            port: var_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: var_or("REQUEST_TIMEOUT_SECS", 30)?,
            query_timeout_secs: var_or("QUERY_TIMEOUT_SECS", 10)?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 20)?,
            ranking,
        })
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn var_or<T: FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    Ok(optional_var(var)?.unwrap_or(default))
}

fn optional_var<T: FromStr>(var: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| ConfigError::Invalid {
            var: var.to_string(),
            value: raw,
        }),
        Err(_) => Ok(None),
    }
}
