//! Configuration module for the exporter.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Server settings (bind address, port, metrics path)
//! - Target device settings (address, scheme, request timeout)
//! - Scrape settings (deadline for one scrape)

mod app;
mod validation;

pub use app::{AppConfig, ScrapeConfig, ServerConfig};
pub use validation::{ConfigError, parse_duration};

// Re-export constants
pub use app::{DEFAULT_METRICS_PATH, DEFAULT_SCRAPE_TIMEOUT};
