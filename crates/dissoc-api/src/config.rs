//! Server configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DB_URL` (or `DATABASE_URL`) | required |
//! | `DB_SCHEMA` | `ns` |
//! | `DB_MAX_CONNECTIONS` | 10 |
//! | `HOST` / `PORT` | `0.0.0.0` / `3000` |
//! | `IMAGE_PATH` | `assets/amygdala.gif` |
//! | `LOG_FORMAT` | `text` (`json` for structured output) |
//! | `LOG_FILE` | unset (stdout) |
//! | `LOG_ANSI` | auto |
//!
//! Logging settings are read separately ([`LogConfig`]) so tracing can be
//! initialized before the rest of the configuration is validated.

use std::path::PathBuf;

use dissoc_core::{Error, Result};
use dissoc_db::{PoolConfig, DEFAULT_SCHEMA};

/// Default image served by `/img`.
pub const DEFAULT_IMAGE_PATH: &str = "assets/amygdala.gif";

/// Logging output settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// "text" or "json".
    pub format: String,
    /// Log file path; logs go to stdout when unset.
    pub file: Option<String>,
    /// Explicit ANSI color override.
    pub ansi: Option<bool>,
}

/// Full server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub schema: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub image_path: PathBuf,
}

fn flag(value: &str) -> bool {
    value == "true" || value == "1"
}

impl LogConfig {
    /// Read logging settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            format: lookup("LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
            file: lookup("LOG_FILE").filter(|f| !f.is_empty()),
            ansi: lookup("LOG_ANSI").map(|v| flag(&v)),
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, so tests need not mutate the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = lookup("DB_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("Missing DB_URL (or DATABASE_URL) environment variable".to_string())
            })?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got '{}'", raw)))?,
            None => 3000,
        };

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                Error::Config(format!(
                    "DB_MAX_CONNECTIONS must be a positive integer, got '{}'",
                    raw
                ))
            })?,
            None => dissoc_db::pool::DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            schema: lookup("DB_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
            max_connections,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            image_path: PathBuf::from(
                lookup("IMAGE_PATH").unwrap_or_else(|| DEFAULT_IMAGE_PATH.to_string()),
            ),
        })
    }

    /// Pool settings derived from this configuration.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::default().max_connections(self.max_connections)
    }
}
