//! Application configuration structures.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::ClientConfig;

use super::validation::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Default path the metrics are served on.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Default deadline for one scrape (10 seconds).
pub const DEFAULT_SCRAPE_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Server Configuration
// =============================================================================

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (default: "0.0.0.0").
    pub bind: String,

    /// Server port (default: 8080).
    pub port: u16,

    /// Path the metrics are served on (default: "/metrics").
    pub path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

// =============================================================================
// Scrape Configuration
// =============================================================================

/// Scrape configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Deadline for fetching every endpoint in one scrape (default: 10s).
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_SCRAPE_TIMEOUT,
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Web server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Wall connector to poll.
    #[serde(default)]
    pub target: ClientConfig,

    /// Scrape configuration.
    #[serde(default)]
    pub scrape: ScrapeConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// Values are not validated here; call [`AppConfig::validate`] once any
    /// CLI/ENV overrides have been applied.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate server bind address
        self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "invalid server bind address: '{}'",
                self.server.bind
            ))
        })?;

        // Validate server port
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server port must be non-zero".to_string(),
            ));
        }

        // Validate metrics path
        if !self.server.path.starts_with('/') {
            return Err(ConfigError::ValidationError(format!(
                "server path must start with '/': '{}'",
                self.server.path
            )));
        }
        if matches!(self.server.path.as_str(), "/" | "/healthz") {
            return Err(ConfigError::ValidationError(format!(
                "server path '{}' is reserved",
                self.server.path
            )));
        }

        // Validate target
        if self.target.addr.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "target addr cannot be empty".to_string(),
            ));
        }
        if !matches!(self.target.scheme.as_str(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "target scheme must be http or https: '{}'",
                self.target.scheme
            )));
        }
        if self.target.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "target timeout must be positive".to_string(),
            ));
        }

        // Validate scrape timeout
        if self.scrape.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "scrape timeout must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DEFAULT_ADDR;
    use std::io::Write;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.path, "/metrics");
    }

    #[test]
    fn test_app_config_default_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.target.addr, DEFAULT_ADDR);
        assert_eq!(config.scrape.timeout, DEFAULT_SCRAPE_TIMEOUT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 9100
target:
  addr: 192.168.1.50
  timeout: 3s
scrape:
  timeout: 5s
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.path, DEFAULT_METRICS_PATH);
        assert_eq!(config.target.addr, "192.168.1.50");
        assert_eq!(config.target.scheme, "http");
        assert_eq!(config.target.timeout, Duration::from_secs(3));
        assert_eq!(config.scrape.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_load_empty_yaml_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{{}}").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.target.addr, DEFAULT_ADDR);
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load("/nonexistent/wallconnector.yaml");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map]").unwrap();

        let result = AppConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_defers_validation_to_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 0").unwrap();

        let mut config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.server.port, 0);
        assert!(config.validate().is_err());

        // e.g. --addr 127.0.0.1:9100
        config.server.bind = "127.0.0.1".to_string();
        config.server.port = 9100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_bind_address() {
        let mut config = AppConfig::default();
        config.server.bind = "not-an-ip".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("invalid server bind address")
        );
    }

    #[test]
    fn test_config_validation_invalid_path() {
        let mut config = AppConfig::default();
        config.server.path = "metrics".to_string();
        assert!(config.validate().is_err());

        config.server.path = "/healthz".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_target() {
        let mut config = AppConfig::default();
        config.target.scheme = "ftp".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.target.addr = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.scrape.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
