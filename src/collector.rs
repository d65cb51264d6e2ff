//! Collector Layer
//!
//! Turns device records into metric samples. Registries are built once at
//! startup from static schema tables; every scrape fans out to all sources
//! concurrently and merges what comes back before the deadline.
//!
//! # Architecture
//!
//! - [`RegistryBuilder`] / [`Registry`]: Field metadata resolved into descriptors
//! - [`Fetcher`]: Capability returning one fresh record
//! - [`MetricSource`]: Core trait for anything that produces samples on demand
//! - [`SchemaSource`]: Registry + fetcher for one device endpoint
//! - [`UptimeSource`]: Exporter start time and current time
//! - [`Collector`]: Concurrent fan-out over all sources
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use tokio::time::Instant;
//! use wallconnector::collector::{Collector, FetchError, RegistryBuilder, SchemaSource, fetch_fn};
//! use wallconnector::schema::Vitals;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = RegistryBuilder::new("wallconnector");
//! let vitals = SchemaSource::build(
//!     &mut builder,
//!     "vitals",
//!     fetch_fn(|_: Instant| async { Ok::<_, FetchError>(Vitals::default()) }),
//! )?;
//! let collector = Collector::new().with_source(vitals);
//! let samples = collector.collect(Duration::from_secs(5)).await;
//! # let _ = samples;
//! # Ok(())
//! # }
//! ```

mod registry;
mod scrape;
mod source;
mod traits;
mod uptime;

pub use registry::{
    ExportRule, LabelValue, Registry, RegistryBuilder, RegistryEntry, SchemaError, fq_name,
};
pub use scrape::Collector;
pub use source::SchemaSource;
pub use traits::{FetchError, Fetcher, FnFetcher, MetricSource, Sample, ValueType, fetch_fn};
pub use uptime::UptimeSource;
