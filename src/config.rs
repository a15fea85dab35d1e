//! Production configuration system
//!
//! Provides centralized configuration management with:
//! - Environment variable support
//! - Config file loading (optional)
//! - Runtime defaults
//! - Validation and type safety

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    pub logging: LoggingConfig,

    /// Output configuration
    pub output: OutputConfig,

    /// Paths configuration
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json_pretty: bool,
    pub timestamp_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the per-day tracking database files.
    pub data_directory: PathBuf,
    pub log_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "ERROR".to_string(),
                format: "pretty".to_string(),
                output: "console".to_string(),
            },
            output: OutputConfig {
                json_pretty: true,
                timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
            },
            paths: PathsConfig {
                data_directory: dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".coding-tracker")
                    .join("database"),
                log_directory: PathBuf::from("logs"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment, file, and defaults
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        // Try to load from config file if it exists
        let config_paths = [
            PathBuf::from("coding-tracker.toml"),
            PathBuf::from(".coding-tracker.toml"),
            dirs::config_dir()
                .map(|d| d.join("coding-tracker").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                info!(config_file = %path.display(), "Loading configuration from file");
                config = Self::load_from_file(path)?;
                break;
            }
        }

        // Override with environment variables
        config.apply_env_overrides();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        // Logging overrides
        if let Ok(val) = env::var("LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = env::var("LOG_FORMAT") {
            self.logging.format = val;
        }
        if let Ok(val) = env::var("LOG_OUTPUT") {
            self.logging.output = val;
        }

        // Path overrides
        if let Ok(val) = env::var("TRACKER_DATA_DIR") {
            self.paths.data_directory = PathBuf::from(val);
        }
        if let Ok(val) = env::var("TRACKER_LOG_DIR") {
            self.paths.log_directory = PathBuf::from(val);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.logging.output.as_str() {
            "console" | "file" | "both" => {}
            other => {
                return Err(anyhow::anyhow!(
                    "Log output must be console, file, or both, got {other}"
                ));
            }
        }

        if self.logging.output != "console" && !self.paths.log_directory.exists() {
            fs::create_dir_all(&self.paths.log_directory)
                .context("Failed to create log directory")?;
        }

        Ok(())
    }
}

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration instance
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load().expect("Failed to load configuration"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "ERROR");
        assert_eq!(config.logging.output, "console");
        assert!(config.paths.data_directory.ends_with("database"));
    }

    #[test]
    fn test_env_override() {
        env::set_var("TRACKER_DATA_DIR", "/tmp/tracker-data");
        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.paths.data_directory, PathBuf::from("/tmp/tracker-data"));
        env::remove_var("TRACKER_DATA_DIR");
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.logging.output = "syslog".to_string();
        assert!(config.validate().is_err());
    }
}
