use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::infrastructure::order_cache::CachePolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_pool_size: u32,
    pub redis_url: String,
    pub cache_enabled: bool,
    pub cache: CachePolicy,
    pub request_timeout: Duration,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Empty values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let vars = Vars { get: &get };

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                vars.string("POSTGRES_USERNAME", "postgres"),
                vars.string("POSTGRES_PASSWORD", "postgres"),
                vars.string("POSTGRES_HOST", "localhost"),
                vars.parse::<u16>("POSTGRES_PORT", 5432)?,
                vars.string("POSTGRES_DATABASE", "postgres"),
            ),
        };

        let write_attempts = vars.parse::<u32>("CACHE_WRITE_ATTEMPTS", 2)?;
        if write_attempts == 0 {
            return Err(invalid("CACHE_WRITE_ATTEMPTS", "0", "must be at least 1"));
        }
        let db_pool_size = vars.parse::<u32>("DB_POOL_SIZE", 10)?;
        if db_pool_size == 0 {
            return Err(invalid("DB_POOL_SIZE", "0", "must be at least 1"));
        }

        Ok(Self {
            host: vars.string("HOST", "0.0.0.0"),
            port: vars.parse("PORT", 8080)?,
            database_url,
            db_pool_size,
            redis_url: vars.string("REDIS_URI", "redis://localhost:6379"),
            cache_enabled: vars.boolean("CACHE_ENABLE", true)?,
            cache: CachePolicy {
                ttl: Duration::from_secs(vars.parse("CACHE_TTL_SECS", 300)?),
                write_attempts,
                retry_delay: Duration::from_millis(vars.parse("CACHE_RETRY_DELAY_MS", 100)?),
                invalidation_timeout: Duration::from_millis(
                    vars.parse("CACHE_INVALIDATION_TIMEOUT_MS", 2000)?,
                ),
                op_timeout: Duration::from_millis(vars.parse("CACHE_OP_TIMEOUT_MS", 3000)?),
            },
            request_timeout: Duration::from_millis(vars.parse("REQUEST_TIMEOUT_MS", 10_000)?),
        })
    }
}

struct Vars<'a> {
    get: &'a dyn Fn(&str) -> Option<String>,
}

impl Vars<'_> {
    fn string(&self, key: &str, default: &str) -> String {
        (self.get)(key).unwrap_or_else(|| default.to_string())
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.get)(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
            None => Ok(default),
        }
    }

    fn boolean(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
        let Some(raw) = (self.get)(key) else {
            return Ok(default);
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(invalid(key, &raw, "expected a boolean")),
        }
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
