//! Wall Connector Exporter
//!
//! Scrapes the local HTTP API of a Tesla Wall Connector and republishes the
//! readings as Prometheus metrics. It can be used as a library by other Rust
//! projects, or run as a standalone binary with the `wallconnector-exporter`
//! executable.
//!
//! # Architecture
//!
//! - **Schema**: Typed device records plus a static metadata table per record
//! - **Collector**: Descriptor registries, metric sources and the concurrent scrape
//! - **Client**: HTTP access to the device's `/api/1/*` endpoints
//! - **Exposition**: Prometheus text rendering
//! - **Server**: The `/metrics` endpoint
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use wallconnector::{Client, ClientConfig, wallconnector_collector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientConfig::new("192.168.1.50"))?;
//!     let collector = wallconnector_collector(&client)?;
//!
//!     let samples = collector.collect(Duration::from_secs(5)).await;
//!     print!("{}", wallconnector::exposition::encode_text(&samples)?);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod collector;
pub mod config;
pub mod exposition;
pub mod schema;
pub mod server;

pub use client::{ApiEndpoint, Client, ClientConfig, ClientError, wallconnector_collector};
pub use collector::{
    Collector, FetchError, Fetcher, MetricSource, RegistryBuilder, Sample, SchemaError,
    SchemaSource, UptimeSource, ValueType,
};
pub use config::{AppConfig, ConfigError};
pub use exposition::{CONTENT_TYPE, ExpositionError, encode_text};
pub use schema::{
    Conversion, FieldMeta, FieldValue, Lifetime, MetricType, Record, Version, Vitals, Wifi,
};
