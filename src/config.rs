use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
#[error("Invalid {key} value: {reason}")]
pub struct ConfigError {
    key: String,
    reason: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub admin_username: String,
    pub admin_password: String,
    pub upload_dir: PathBuf,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let admin_password = try_load::<String>("ADMIN_PASSWORD", "admin")?;
        if admin_password == "admin" {
            warn!("ADMIN_PASSWORD is the default, change it before going public");
        }

        Ok(Self {
            port: try_load("PORT", "3001")?,
            database_url: try_load("DATABASE_URL", "volley-site.db")?,
            admin_username: try_load("ADMIN_USERNAME", "admin")?,
            admin_password,
            upload_dir: try_load("UPLOAD_DIR", "public/uploads")?,
            session_ttl_hours: session_ttl(try_load("SESSION_TTL_HOURS", "24")?)?,
        })
    }

    /// Throwaway configuration backed by an in-memory database.
    pub fn in_memory(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            port: 0,
            database_url: ":memory:".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            upload_dir: upload_dir.into(),
            session_ttl_hours: 24,
        }
    }
}

/// One year at most.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 366;

fn session_ttl(hours: i64) -> Result<i64, ConfigError> {
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        return Err(ConfigError {
            key: "SESSION_TTL_HOURS".to_string(),
            reason: format!("{hours} is outside 1..={MAX_SESSION_TTL_HOURS}"),
        });
    }
    Ok(hours)
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse_value(key, &raw)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
