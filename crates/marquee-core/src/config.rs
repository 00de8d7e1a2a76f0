//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/marquee/config.toml)
//! 3. Environment variables (MARQUEE_* prefix)
//!
//! Environment variables take precedence over config file values.
//!
//! The table name has no default. A missing table name is not a load error;
//! it surfaces as a storage error the first time the table is used.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "MARQUEE";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the SQLite database
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Name of the table holding movie records
    #[serde(default)]
    pub table_name: Option<String>,

    /// Log level used when RUST_LOG is not set (e.g. "info", "debug")
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            table_name: None,
            log_level: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (MARQUEE_DATA_DIR, MARQUEE_TABLE_NAME, MARQUEE_LOG_LEVEL)
    /// 2. Config file (~/.config/marquee/config.toml or MARQUEE_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Build a configuration for a given data directory and table
    pub fn for_table(data_dir: impl Into<PathBuf>, table_name: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            table_name: Some(table_name.into()),
            log_level: None,
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // MARQUEE_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // MARQUEE_TABLE_NAME
        if let Ok(val) = std::env::var(format!("{}_TABLE_NAME", ENV_PREFIX)) {
            self.table_name = if val.is_empty() { None } else { Some(val) };
        }

        // MARQUEE_LOG_LEVEL
        if let Ok(val) = std::env::var(format!("{}_LOG_LEVEL", ENV_PREFIX)) {
            self.log_level = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Get the config file path
    ///
    /// Can be overridden with MARQUEE_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("marquee")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("marquee.db")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marquee")
}
