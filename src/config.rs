use std::{env, fmt::Display, str::FromStr};

use log::info;

use crate::error::ElectionError;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub status_check_interval_seconds: u64,
    /// Refuse to produce results when a ballot names someone who was never
    /// nominated, instead of leaving those votes out.
    pub strict_tally_integrity: bool,
}

impl Config {
    pub fn load() -> Result<Self, ElectionError> {
        Ok(Self {
            database_url: try_load("DATABASE_URL", "sqlite:greekone_elections.db")?,
            max_connections: non_zero("DB_MAX_CONNECTIONS", try_load("DB_MAX_CONNECTIONS", "5")?)?,
            status_check_interval_seconds: non_zero(
                "STATUS_CHECK_INTERVAL_SECONDS",
                try_load("STATUS_CHECK_INTERVAL_SECONDS", "60")?,
            )?,
            strict_tally_integrity: try_load("STRICT_TALLY_INTEGRITY", "false")?,
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ElectionError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    parse_value(key, &raw)
}

fn parse_value<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ElectionError>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ElectionError::Config {
        key,
        message: format!("{raw:?}: {e}"),
    })
}

fn non_zero<T: Default + PartialEq>(key: &'static str, value: T) -> Result<T, ElectionError> {
    if value == T::default() {
        return Err(ElectionError::Config {
            key,
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}
