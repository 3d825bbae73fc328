//! Configuration management for the drivex server.
//!
//! Configuration is layered from three sources:
//! 1. Default values (hardcoded)
//! 2. Configuration file (YAML)
//! 3. Environment variables (override)
//!
//! Environment variables take precedence over config file values, which take
//! precedence over defaults.
//!
//! # Example
//!
//! ```ignore
//! use drivex_server::config::ServerConfig;
//!
//! // Load from file with env overrides
//! let config = ServerConfig::load("config.yaml")?;
//!
//! // Or load from environment only
//! let config = ServerConfig::from_env()?;
//! ```

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use drivex_domain::DEFAULT_MIN_IDENTIFIER_LEN;

/// Upper bound for `extraction.min_identifier_len`.
///
/// Real Drive identifiers top out well below this; a larger minimum would
/// make every extraction fail.
const MAX_MIN_IDENTIFIER_LEN: usize = 128;

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Extraction rule settings
    #[serde(default)]
    pub extraction: ExtractionSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Metrics settings
    #[serde(default)]
    pub metrics: MetricsSettings,
}

/// Server network settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerSettings {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Extraction rule settings.
///
/// The minimum length is read once at startup to build the extractor; it is
/// not hot-reloadable.
///
/// Environment variable: `DRIVEX_EXTRACTION__MIN_IDENTIFIER_LEN`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExtractionSettings {
    /// Minimum length of a captured identifier. Runs shorter than this do
    /// not match.
    #[serde(default = "default_min_identifier_len")]
    pub min_identifier_len: usize,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            min_identifier_len: default_min_identifier_len(),
        }
    }
}

fn default_min_identifier_len() -> usize {
    DEFAULT_MIN_IDENTIFIER_LEN
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Use JSON format (true for production, false for development)
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MetricsSettings {
    /// Enable metrics endpoint
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_metrics_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable overrides.
    ///
    /// Environment variables are prefixed with `DRIVEX_` and use `__` as
    /// separator. For example:
    /// - `DRIVEX_SERVER__PORT=9090` overrides `server.port`
    /// - `DRIVEX_EXTRACTION__MIN_IDENTIFIER_LEN=25` overrides
    ///   `extraction.min_identifier_len`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigLoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let config = Config::builder()
            // Start with defaults
            .add_source(Config::try_from(&ServerConfig::default())?)
            // Add config file
            .add_source(File::from(path).format(FileFormat::Yaml))
            // Add environment variables with DRIVEX_ prefix
            // Use __ as separator for nested keys: DRIVEX_SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("DRIVEX")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Load configuration from environment variables only.
    ///
    /// Uses default values and allows overrides via DRIVEX_ prefixed env vars.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        let config = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(
                Environment::with_prefix("DRIVEX")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let server_config: ServerConfig = config.try_deserialize()?;
        server_config.validate()?;

        Ok(server_config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.port == 0 {
            return Err(ConfigLoadError::Invalid {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.extraction.min_identifier_len == 0
            || self.extraction.min_identifier_len > MAX_MIN_IDENTIFIER_LEN
        {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "extraction.min_identifier_len must be between 1 and {}, got: {}",
                    MAX_MIN_IDENTIFIER_LEN, self.extraction.min_identifier_len
                ),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigLoadError::Invalid {
                message: format!(
                    "logging.level must be one of: {:?}, got: {}",
                    valid_levels, self.logging.level
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Test: Can load config from YAML file
    #[test]
    #[serial]
    fn test_can_load_config_from_yaml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 9090

extraction:
  min_identifier_len: 25

logging:
  level: debug
  json: true

metrics:
  enabled: true
  path: /custom-metrics
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.extraction.min_identifier_len, 25);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.path, "/custom-metrics");
    }

    /// Test: Can override config with env vars
    #[test]
    #[serial]
    fn test_can_override_config_with_env_vars() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 8080
"#
        )
        .unwrap();

        std::env::set_var("DRIVEX_SERVER__PORT", "9999");
        std::env::set_var("DRIVEX_EXTRACTION__MIN_IDENTIFIER_LEN", "15");

        let config = ServerConfig::load(file.path()).unwrap();

        std::env::remove_var("DRIVEX_SERVER__PORT");
        std::env::remove_var("DRIVEX_EXTRACTION__MIN_IDENTIFIER_LEN");

        assert_eq!(config.server.port, 9999); // Overridden by env
        assert_eq!(config.server.host, "127.0.0.1"); // From file
        assert_eq!(config.extraction.min_identifier_len, 15); // Overridden by env
    }

    /// Test: Config validation catches errors
    #[test]
    fn test_config_validation_catches_errors() {
        // Zero port
        let mut config = ServerConfig::default();
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));

        // Zero minimum length
        let mut config = ServerConfig::default();
        config.extraction.min_identifier_len = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_identifier_len"));

        // Absurd minimum length
        let mut config = ServerConfig::default();
        config.extraction.min_identifier_len = 4096;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_identifier_len"));

        // Invalid log level
        let mut config = ServerConfig::default();
        config.logging.level = "invalid".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    /// Test: Invalid config returns clear error
    #[test]
    fn test_invalid_config_returns_clear_error() {
        // File not found
        let result = ServerConfig::load("/nonexistent/path/config.yaml");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigLoadError::FileNotFound { .. }));
        assert!(err.to_string().contains("not found"));

        // Invalid YAML syntax
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: syntax: [").unwrap();

        let result = ServerConfig::load(file.path());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigLoadError::Load(_)));
    }

    /// Test: Default config is valid
    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.extraction.min_identifier_len,
            DEFAULT_MIN_IDENTIFIER_LEN
        );
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.metrics.enabled);
    }

    /// Test: from_env loads defaults with env overrides
    #[test]
    #[serial]
    fn test_from_env_loads_defaults_with_env_overrides() {
        std::env::set_var("DRIVEX_SERVER__HOST", "192.168.1.1");

        let config = ServerConfig::from_env().unwrap();

        std::env::remove_var("DRIVEX_SERVER__HOST");

        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 8080); // default
    }
}
