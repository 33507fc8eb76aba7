//! Application configuration.
//!
//! # Responsibility
//! - Describe which database a context opens and how it logs and hashes.
//! - Keep production and testing targets on separate databases.
//! - Load overrides from `RECIPEBOOK_*` environment variables.
//!
//! # Invariants
//! - Database URIs use the `sqlite://` scheme; anything else is rejected.
//! - `password_cost` is always inside bcrypt's accepted range.

use crate::logging::{default_log_level, normalize_level};
use crate::model::credential::{DEFAULT_PASSWORD_COST, MAX_PASSWORD_COST, MIN_PASSWORD_COST};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DATABASE_URI: &str = "RECIPEBOOK_DATABASE_URI";
pub const ENV_TESTING: &str = "RECIPEBOOK_TESTING";
pub const ENV_LOG_LEVEL: &str = "RECIPEBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "RECIPEBOOK_LOG_DIR";
pub const ENV_PASSWORD_COST: &str = "RECIPEBOOK_PASSWORD_COST";

const PRODUCTION_DATABASE_FILE: &str = "app.db";
const TESTING_DATABASE_FILE: &str = "app_test.db";
const MEMORY_PATH: &str = ":memory:";

static SQLITE_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sqlite://(?:/(?P<path>.*))?$").expect("valid sqlite uri regex"));

/// Configuration error with the offending key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidDatabaseUri(String),
    InvalidLogLevel(String),
    InvalidBool { key: &'static str, value: String },
    InvalidPasswordCost(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDatabaseUri(uri) => write!(
                f,
                "unsupported database uri `{uri}`; expected sqlite://, sqlite:///<path> or sqlite:///:memory:"
            ),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::InvalidBool { key, value } => {
                write!(f, "{key} must be true/false/1/0, got `{value}`")
            }
            Self::InvalidPasswordCost(value) => write!(
                f,
                "{ENV_PASSWORD_COST} must be an integer in {MIN_PASSWORD_COST}..={MAX_PASSWORD_COST}, got `{value}`"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Where a context keeps its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// Private database living as long as the connection.
    Memory,
    File(PathBuf),
}

impl DatabaseTarget {
    /// Parses a `sqlite://` URI.
    ///
    /// - `sqlite://` and `sqlite:///:memory:` map to `Memory`.
    /// - `sqlite:///app.db` maps to the relative path `app.db`.
    /// - `sqlite:////var/db/app.db` maps to the absolute path `/var/db/app.db`.
    pub fn parse_uri(uri: &str) -> Result<Self, ConfigError> {
        let trimmed = uri.trim();
        let captures = SQLITE_URI_RE
            .captures(trimmed)
            .ok_or_else(|| ConfigError::InvalidDatabaseUri(trimmed.to_string()))?;

        match captures.name("path").map(|m| m.as_str()) {
            None | Some("") | Some(MEMORY_PATH) => Ok(Self::Memory),
            Some(path) => Ok(Self::File(PathBuf::from(path))),
        }
    }

    /// Renders this target back to its URI form.
    pub fn to_uri(&self) -> String {
        match self {
            Self::Memory => format!("sqlite:///{MEMORY_PATH}"),
            Self::File(path) => format!("sqlite:///{}", path.display()),
        }
    }
}

/// Settings an `AppContext` is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: DatabaseTarget,
    pub testing: bool,
    pub log_level: &'static str,
    /// Rolling log files are written here when set.
    pub log_dir: Option<PathBuf>,
    pub password_cost: u32,
}

impl AppConfig {
    /// File-backed production defaults.
    pub fn production() -> Self {
        Self {
            database: DatabaseTarget::File(PathBuf::from(PRODUCTION_DATABASE_FILE)),
            testing: false,
            log_level: default_log_level(),
            log_dir: None,
            password_cost: DEFAULT_PASSWORD_COST,
        }
    }

    /// Isolated in-memory defaults with the cheapest bcrypt cost.
    pub fn testing() -> Self {
        Self {
            database: DatabaseTarget::Memory,
            testing: true,
            log_level: "debug",
            log_dir: None,
            password_cost: MIN_PASSWORD_COST,
        }
    }

    /// Testing defaults backed by the separate test database file.
    pub fn testing_file() -> Self {
        Self::testing().with_database(DatabaseTarget::File(PathBuf::from(TESTING_DATABASE_FILE)))
    }

    pub fn with_database(mut self, database: DatabaseTarget) -> Self {
        self.database = database;
        self
    }

    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// `RECIPEBOOK_TESTING` picks the base profile; the remaining keys
    /// override individual fields.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let testing = match lookup(ENV_TESTING) {
            Some(value) => parse_bool(ENV_TESTING, &value)?,
            None => false,
        };
        let mut config = if testing {
            Self::testing()
        } else {
            Self::production()
        };

        if let Some(uri) = lookup(ENV_DATABASE_URI) {
            config.database = DatabaseTarget::parse_uri(&uri)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(ConfigError::InvalidLogLevel)?;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|dir| !dir.trim().is_empty()) {
            config.log_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(cost) = lookup(ENV_PASSWORD_COST) {
            config.password_cost = parse_password_cost(&cost)?;
        }

        Ok(config)
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_password_cost(value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|cost| (MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(cost))
        .ok_or_else(|| ConfigError::InvalidPasswordCost(value.to_string()))
}
