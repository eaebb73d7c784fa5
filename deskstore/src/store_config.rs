//! Configuration of a [crate::DeskStore].

use crate::collection::CollectionDefaults;
use crate::common::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DATABASE_NAME, ENV_CONNECT_TIMEOUT_MS, ENV_DATABASE_NAME,
    ENV_LIVE_URL, ENV_SEED_FIXTURES,
};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use std::time::Duration;

fn config_error(message: String) -> StoreError {
    log::error!("{}", message);
    StoreError::new(&message, ErrorKind::ConfigError)
}

/// Settings of a store.
///
/// | Setting | Default | Environment |
/// |---|---|---|
/// | `live_url` | none | `DESKSTORE_URL` |
/// | `database_name` | `"dashboard"` | `DESKSTORE_DB_NAME` |
/// | `connect_timeout` | 5 s | `DESKSTORE_CONNECT_TIMEOUT_MS` |
/// | `seed_fixtures` | `false` | `DESKSTORE_SEED_FIXTURES` |
/// | `defaults` | dashboard defaults | |
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    live_url: Option<String>,
    database_name: String,
    connect_timeout: Duration,
    seed_fixtures: bool,
    defaults: CollectionDefaults,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::new()
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        StoreConfig {
            live_url: None,
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            seed_fixtures: false,
            defaults: CollectionDefaults::dashboard(),
        }
    }

    /// Reads the settings present in the process environment. Unset
    /// variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` when a variable is set to an unusable value.
    pub fn from_env() -> StoreResult<StoreConfig> {
        StoreConfig::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [StoreConfig::from_env] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> StoreResult<StoreConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoreConfig::new();

        if let Some(url) = lookup(ENV_LIVE_URL) {
            config.set_live_url(&url)?;
        }

        if let Some(name) = lookup(ENV_DATABASE_NAME) {
            config.set_database_name(&name)?;
        }

        if let Some(timeout) = lookup(ENV_CONNECT_TIMEOUT_MS) {
            let millis = timeout.trim().parse::<u64>().map_err(|_| {
                config_error(format!(
                    "{} must be a whole number of milliseconds, found {:?}",
                    ENV_CONNECT_TIMEOUT_MS, timeout
                ))
            })?;
            config.set_connect_timeout(Duration::from_millis(millis))?;
        }

        if let Some(seed) = lookup(ENV_SEED_FIXTURES) {
            config.seed_fixtures = parse_flag(ENV_SEED_FIXTURES, &seed)?;
        }

        Ok(config)
    }

    /// Address of the live database, `None` when only the embedded store
    /// should be used.
    pub fn live_url(&self) -> Option<&str> {
        self.live_url.as_deref()
    }

    pub fn set_live_url(&mut self, url: &str) -> StoreResult<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(config_error("Live database url cannot be empty".to_string()));
        }
        self.live_url = Some(url.to_string());
        Ok(())
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn set_database_name(&mut self, name: &str) -> StoreResult<()> {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(config_error(format!(
                "Database name {:?} must be non-empty and contain no whitespace",
                name
            )));
        }
        self.database_name = name.to_string();
        Ok(())
    }

    /// Longest time the first collection access waits for the live database.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) -> StoreResult<()> {
        if timeout.is_zero() {
            return Err(config_error("Connect timeout must be positive".to_string()));
        }
        self.connect_timeout = timeout;
        Ok(())
    }

    /// Whether the embedded store is preloaded with sample dashboard data.
    pub fn seed_fixtures(&self) -> bool {
        self.seed_fixtures
    }

    pub fn set_seed_fixtures(&mut self, seed: bool) {
        self.seed_fixtures = seed;
    }

    pub fn defaults(&self) -> &CollectionDefaults {
        &self.defaults
    }

    pub fn set_defaults(&mut self, defaults: CollectionDefaults) {
        self.defaults = defaults;
    }
}

fn parse_flag(name: &str, value: &str) -> StoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(config_error(format!(
            "{} must be a boolean flag, found {:?}",
            name, value
        ))),
    }
}
