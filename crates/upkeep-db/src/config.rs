//! # Application Configuration
//!
//! Loads `upkeep.toml` for the stock ledger and the validator.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     UPKEEP_DATABASE_PATH=/var/lib/upkeep/stock.db                      │
//! │     UPKEEP_MAX_LINE_ITEMS=30                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stockroom/upkeep.toml (Linux)                            │
//! │     ~/Library/Application Support/com.upkeep.stockroom/upkeep.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/upkeep/stock.db"
//! max_connections = 5
//! connect_timeout_secs = 30
//! run_migrations = true
//!
//! [validation]
//! max_line_items = 50
//! min_quantity = "0.01"
//! max_quantity = "999999"
//! description_min_length = 5
//! low_stock_warnings = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use upkeep_core::ValidationConfig;

use crate::pool::DbConfig;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Database Settings
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file path. Created if missing.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "upkeep", "stockroom")
        .map(|dirs| dirs.data_dir().join("upkeep.db"))
        .unwrap_or_else(|| PathBuf::from("upkeep.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout(),
            run_migrations: true,
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub validation: ValidationConfig,
}

impl AppConfig {
    /// Loads configuration from file and environment.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from TOML file (if exists)
    /// 3. Override with `UPKEEP_*` environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        self.validation
            .check()
            .map_err(|msg| ConfigError::Invalid(format!("validation.{}", msg)))
    }

    /// Connection settings for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
            .run_migrations(self.database.run_migrations)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `UPKEEP_*` overrides from a variable lookup.
    ///
    /// Unparseable values are ignored with a warning.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("UPKEEP_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(value) = lookup("UPKEEP_MAX_CONNECTIONS") {
            match value.parse() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => warn!(value = %value, "Ignoring invalid UPKEEP_MAX_CONNECTIONS"),
            }
        }

        if let Some(value) = lookup("UPKEEP_MAX_LINE_ITEMS") {
            match value.parse() {
                Ok(n) => self.validation.max_line_items = n,
                Err(_) => warn!(value = %value, "Ignoring invalid UPKEEP_MAX_LINE_ITEMS"),
            }
        }

        if let Some(value) = lookup("UPKEEP_LOW_STOCK_WARNINGS") {
            match value.to_lowercase().as_str() {
                "1" | "true" | "on" => self.validation.low_stock_warnings = true,
                "0" | "false" | "off" => self.validation.low_stock_warnings = false,
                _ => warn!(value = %value, "Ignoring invalid UPKEEP_LOW_STOCK_WARNINGS"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "upkeep", "stockroom")
            .map(|dirs| dirs.config_dir().join("upkeep.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_sections_default_independently() {
        let config = AppConfig::from_toml_str(
            r#"
            [database]
            path = "/tmp/stock.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, PathBuf::from("/tmp/stock.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.validation, ValidationConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("UPKEEP_DATABASE_PATH", "/data/upkeep.db"),
            ("UPKEEP_MAX_LINE_ITEMS", "25"),
            ("UPKEEP_LOW_STOCK_WARNINGS", "off"),
            ("UPKEEP_MAX_CONNECTIONS", "many"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/data/upkeep.db"));
        assert_eq!(config.validation.max_line_items, 25);
        assert!(!config.validation.low_stock_warnings);
        // Invalid value leaves the default
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_validate_rejects_bad_limits() {
        let mut config = AppConfig::default();
        config.validation.max_line_items = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("validation.max_line_items"));

        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relaxed_item_cap() {
        let vars: HashMap<&str, &str> = [("UPKEEP_MAX_LINE_ITEMS", "100")].into_iter().collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_line_items must not exceed 50"));

        let config = AppConfig::from_toml_str(
            r#"
            [validation]
            description_min_length = 0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::load(Some(PathBuf::from("/nonexistent/upkeep.toml"))).unwrap();
        assert_eq!(config.validation.max_line_items, 50);
    }

    #[test]
    fn test_db_config_carries_settings() {
        let mut config = AppConfig::default();
        config.database.max_connections = 3;
        config.database.run_migrations = false;

        let db = config.db_config();
        assert_eq!(db.max_connections, 3);
        assert!(!db.run_migrations);
    }
}
