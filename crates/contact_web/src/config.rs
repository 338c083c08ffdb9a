//! Server configuration from environment variables.
//!
//! # Invariants
//! - Malformed bind addresses and log levels are errors.
//! - Out-of-range numeric settings fall back to defaults with a warning.

use contact_core::default_log_level;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_BIND: &str = "CONTACT_HTTP_BIND";
pub const ENV_DB_PATH: &str = "CONTACT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "CONTACT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CONTACT_LOG_DIR";
pub const ENV_STORE_TIMEOUT_MS: &str = "CONTACT_STORE_TIMEOUT_MS";
pub const ENV_SESSION_IDLE_SECS: &str = "CONTACT_SESSION_IDLE_SECS";

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_DB_PATH: &str = "contacts.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "contact_web-logs";
const DEFAULT_STORE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_SESSION_IDLE_SECS: u64 = 60;

#[derive(Debug)]
pub enum ConfigError {
    InvalidBind { value: String, reason: String },
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBind { value, reason } => {
                write!(f, "invalid {ENV_BIND} `{value}`: {reason}")
            }
            Self::InvalidLogLevel(value) => write!(
                f,
                "invalid {ENV_LOG_LEVEL} `{value}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling log files.
    pub log_dir: PathBuf,
    /// Upper bound for one workflow's store work.
    pub store_timeout: Duration,
    /// Flash notices of sessions idle longer than this are discarded.
    pub session_idle: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_text = read(ENV_BIND).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_text
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidBind {
                value: bind_text.clone(),
                reason: err.to_string(),
            })?;

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(value) => parse_log_level(&value)?,
            None => default_log_level().to_string(),
        };

        let log_dir = read(ENV_LOG_DIR)
            .map(PathBuf::from)
            .filter(|path| path.is_absolute())
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME));

        Ok(Self {
            bind,
            db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            log_level,
            log_dir,
            store_timeout: Duration::from_millis(parse_bounded(
                ENV_STORE_TIMEOUT_MS,
                read(ENV_STORE_TIMEOUT_MS),
                50..=60_000,
                DEFAULT_STORE_TIMEOUT_MS,
            )),
            session_idle: Duration::from_secs(parse_bounded(
                ENV_SESSION_IDLE_SECS,
                read(ENV_SESSION_IDLE_SECS),
                1..=86_400,
                DEFAULT_SESSION_IDLE_SECS,
            )),
        })
    }
}

fn parse_log_level(value: &str) -> Result<String, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        level @ ("trace" | "debug" | "info" | "warn" | "error") => Ok(level.to_string()),
        "warning" => Ok("warn".to_string()),
        _ => Err(ConfigError::InvalidLogLevel(value.to_string())),
    }
}

fn parse_bounded(
    key: &str,
    value: Option<String>,
    range: std::ops::RangeInclusive<u64>,
    default: u64,
) -> u64 {
    let Some(value) = value else {
        return default;
    };
    match value.parse::<u64>() {
        Ok(parsed) if range.contains(&parsed) => parsed,
        _ => {
            warn!(
                "event=config_fallback module=config status=warn key={key} value={value} default={default}"
            );
            default
        }
    }
}
