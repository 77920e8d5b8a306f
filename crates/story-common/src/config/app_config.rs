//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    /// Redis is optional; without it notifications are logged and dropped
    pub redis: Option<RedisConfig>,
    pub ranking: RankingConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(()),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Directory holding the SQL migrations; unset uses the copy next to the sources
    #[serde(default)]
    pub migrations_dir: Option<PathBuf>,
}

impl DatabaseConfig {
    #[must_use]
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Batch ranking and reconciliation schedule
#[derive(Debug, Clone, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_recompute_interval_secs")]
    pub recompute_interval_secs: u64,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_recompute_on_startup")]
    pub recompute_on_startup: bool,
    /// 0 disables periodic reconciliation
    #[serde(default)]
    pub reconcile_interval_secs: u64,
}

impl RankingConfig {
    #[must_use]
    pub fn recompute_interval(&self) -> Duration {
        Duration::from_secs(self.recompute_interval_secs.max(1))
    }

    #[must_use]
    pub fn reconcile_interval(&self) -> Option<Duration> {
        (self.reconcile_interval_secs > 0).then(|| Duration::from_secs(self.reconcile_interval_secs))
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            recompute_interval_secs: default_recompute_interval_secs(),
            batch_size: default_batch_size(),
            recompute_on_startup: default_recompute_on_startup(),
            reconcile_interval_secs: 0,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "story-engine".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    10
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_recompute_interval_secs() -> u64 {
    3600 // hourly
}

fn default_batch_size() -> u32 {
    500
}

fn default_recompute_on_startup() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(&lookup);

        let redis = match vars.get("REDIS_URL") {
            Some(url) => Some(RedisConfig {
                url,
                max_connections: vars
                    .parse_or("REDIS_MAX_CONNECTIONS", default_redis_max_connections)?,
            }),
            None => None,
        };

        Ok(Self {
            app: AppSettings {
                name: vars.get("APP_NAME").unwrap_or_else(default_app_name),
                env: vars
                    .get("APP_ENV")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: vars
                    .get("DATABASE_URL")
                    .ok_or(ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: vars
                    .parse_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: vars
                    .parse_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                acquire_timeout_secs: vars
                    .parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", default_acquire_timeout_secs)?,
                migrations_dir: vars.get("DATABASE_MIGRATIONS_DIR").map(PathBuf::from),
            },
            redis,
            ranking: RankingConfig {
                recompute_interval_secs: vars.parse_or(
                    "RANKING_RECOMPUTE_INTERVAL_SECS",
                    default_recompute_interval_secs,
                )?,
                batch_size: vars.parse_or("RANKING_BATCH_SIZE", default_batch_size)?,
                recompute_on_startup: vars
                    .parse_or("RANKING_RECOMPUTE_ON_STARTUP", default_recompute_on_startup)?,
                reconcile_interval_secs: vars.parse_or("RECONCILE_INTERVAL_SECS", || 0)?,
            },
        })
    }
}

struct Vars<'a, F>(&'a F);

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parse_or<T: FromStr>(
        &self,
        key: &'static str,
        default: impl FnOnce() -> T,
    ) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key, raw)),
            None => Ok(default()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
