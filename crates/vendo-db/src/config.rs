//! # Application Configuration
//!
//! Environment-driven settings for processes embedding vendo-db.
//!
//! ## Variables
//! ```text
//! ┌──────────────────────────┬──────────────────┬──────────────────────────┐
//! │ variable                 │ default          │ meaning                  │
//! ├──────────────────────────┼──────────────────┼──────────────────────────┤
//! │ VENDO_DB_PATH            │ ./vendo.db       │ SQLite file              │
//! │ VENDO_MAX_CONNECTIONS    │ 5                │ pool size                │
//! │ VENDO_BUSY_TIMEOUT_MS    │ 5000             │ writer lock wait         │
//! │ VENDO_UTC_OFFSET_HOURS   │ -5               │ business-day clock       │
//! │ VENDO_CURRENCY_SYMBOL    │ S/.              │ audit text currency      │
//! └──────────────────────────┴──────────────────┴──────────────────────────┘
//! ```

use chrono::{FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::pool::DbConfig;

pub const ENV_DB_PATH: &str = "VENDO_DB_PATH";
pub const ENV_MAX_CONNECTIONS: &str = "VENDO_MAX_CONNECTIONS";
pub const ENV_BUSY_TIMEOUT_MS: &str = "VENDO_BUSY_TIMEOUT_MS";
pub const ENV_UTC_OFFSET_HOURS: &str = "VENDO_UTC_OFFSET_HOURS";
pub const ENV_CURRENCY_SYMBOL: &str = "VENDO_CURRENCY_SYMBOL";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable was set to an unusable value.
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout_ms: u64,
    /// Offset from UTC used to decide which calendar day a sale belongs to.
    pub utc_offset_hours: i32,
    pub currency_symbol: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from("./vendo.db"),
            max_connections: 5,
            busy_timeout_ms: 5000,
            utc_offset_hours: -5,
            currency_symbol: vendo_core::DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(path) = lookup(ENV_DB_PATH).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_MAX_CONNECTIONS) {
            config.max_connections = parse_var(ENV_MAX_CONNECTIONS, &raw)?;
            if config.max_connections == 0 {
                return Err(ConfigError::InvalidValue(ENV_MAX_CONNECTIONS.to_string()));
            }
        }
        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms = parse_var(ENV_BUSY_TIMEOUT_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_UTC_OFFSET_HOURS) {
            let hours: i32 = parse_var(ENV_UTC_OFFSET_HOURS, &raw)?;
            if !(-23..=23).contains(&hours) {
                return Err(ConfigError::InvalidValue(ENV_UTC_OFFSET_HOURS.to_string()));
            }
            config.utc_offset_hours = hours;
        }
        if let Some(symbol) = lookup(ENV_CURRENCY_SYMBOL) {
            config.currency_symbol = symbol.trim().to_string();
        }

        Ok(config)
    }

    /// Today's date on the business clock.
    pub fn today(&self) -> NaiveDate {
        // east_opt only fails outside ±24h
        match FixedOffset::east_opt(self.utc_offset_hours * 3600) {
            Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
            None => Utc::now().date_naive(),
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .busy_timeout(Duration::from_millis(self.busy_timeout_ms))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.currency_symbol, "S/.");
        assert_eq!(config.utc_offset_hours, -5);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/var/lib/vendo/shop.db"),
            (ENV_MAX_CONNECTIONS, "8"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_UTC_OFFSET_HOURS, "0"),
            (ENV_CURRENCY_SYMBOL, "$"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/vendo/shop.db"));
        assert_eq!(config.currency_symbol, "$");

        let db = config.db_config();
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            AppConfig::from_lookup(lookup(&[(ENV_MAX_CONNECTIONS, "many")])),
            Err(ConfigError::InvalidValue(ENV_MAX_CONNECTIONS.to_string()))
        );
        assert!(AppConfig::from_lookup(lookup(&[(ENV_MAX_CONNECTIONS, "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[(ENV_UTC_OFFSET_HOURS, "30")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[(ENV_BUSY_TIMEOUT_MS, "-1")])).is_err());
    }

    #[test]
    fn test_today_uses_offset() {
        let utc = AppConfig {
            utc_offset_hours: 0,
            ..AppConfig::default()
        };
        let diff = (utc.today() - Utc::now().date_naive()).num_days();
        assert_eq!(diff, 0);
    }
}
