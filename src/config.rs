//! Environment-driven process configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `DATABASE_URL` | required |
//! | `TASKLANE_HOST` | `0.0.0.0` |
//! | `TASKLANE_PORT` | `3000` |
//! | `TASKLANE_DB_POOL_SIZE` | `10` |
//! | `TASKLANE_LOG_FORMAT` | `text` (`text` or `json`) |
//! | `TASKLANE_APPLY_SCHEMA` | `false` |
//!
//! Values may also come from a `.env` file. Variables already set in the
//! process environment take precedence over the file.

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    /// A variable holds a value that cannot be used.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Why the value was rejected.
        message: String,
    },

    /// A `.env` file exists but cannot be read.
    #[error("failed to load .env file: {0}")]
    EnvFile(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `text` or `json`, got `{other}`")),
        }
    }
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// HTTP bind host.
    pub host: String,
    /// HTTP bind port.
    pub port: u16,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// Log output format.
    pub log_format: LogFormat,
    /// Whether to create missing tables at startup.
    pub apply_schema: bool,
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] when `DATABASE_URL` is unset and
    /// [`ConfigError::InvalidValue`] when any variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let file_vars = read_env_file(dotenvy::dotenv_iter())?;
        Self::from_lookup(layered(file_vars, |key| env::var(key).ok()))
    }

    /// Loads configuration from the `.env`-format file at `path`, with
    /// `lookup` taking precedence over it. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EnvFile`] when the file exists but cannot be
    /// parsed, otherwise as [`AppConfig::from_env`].
    pub fn from_env_file<F>(path: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file_vars = read_env_file(dotenvy::from_path_iter(path))?;
        Self::from_lookup(layered(file_vars, lookup))
    }

    /// Loads configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is unset.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar("DATABASE_URL"))?;
        let host = lookup("TASKLANE_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let port = parse_or(&lookup, "TASKLANE_PORT", 3000)?;
        let pool_size = parse_or(&lookup, "TASKLANE_DB_POOL_SIZE", 10)?;
        if pool_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "TASKLANE_DB_POOL_SIZE",
                message: "must be at least 1".to_owned(),
            });
        }
        let log_format = parse_or(&lookup, "TASKLANE_LOG_FORMAT", LogFormat::Text)?;
        let apply_schema = parse_or(&lookup, "TASKLANE_APPLY_SCHEMA", false)?;

        Ok(Self {
            database_url,
            host,
            port,
            pool_size,
            log_format,
            apply_schema,
        })
    }

    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_env_file(
    opened: dotenvy::Result<dotenvy::Iter<File>>,
) -> Result<HashMap<String, String>, ConfigError> {
    match opened {
        Ok(entries) => entries
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(|err| ConfigError::EnvFile(err.to_string())),
        Err(err) if err.not_found() => Ok(HashMap::new()),
        Err(err) => Err(ConfigError::EnvFile(err.to_string())),
    }
}

fn layered<F>(file_vars: HashMap<String, String>, lookup: F) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key| lookup(key).or_else(|| file_vars.get(key).cloned())
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim().parse::<T>().map_err(|err| ConfigError::InvalidValue {
            key,
            message: err.to_string(),
        })
    })
}
