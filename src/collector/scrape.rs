//! Scrape fan-out across every registered metric source.

use std::sync::Arc;
use std::time::Duration;

use prometheus::core::Desc;
use tokio::task::JoinSet;
use tokio::time::{Instant, timeout_at};

use crate::collector::{MetricSource, Sample};

/// Aggregates metric sources and scrapes them concurrently.
///
/// Each scrape spawns one task per source. Every task owns its result buffer;
/// buffers are merged once all tasks have finished or hit the deadline.
#[derive(Clone, Default)]
pub struct Collector {
    sources: Vec<Arc<dyn MetricSource>>,
}

impl Collector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a source.
    pub fn register(&mut self, source: impl MetricSource) {
        self.sources.push(Arc::new(source));
    }

    /// Add a source, builder style.
    #[must_use]
    pub fn with_source(mut self, source: impl MetricSource) -> Self {
        self.register(source);
        self
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True when no source is registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Descriptors of every source. Shared descriptors may repeat.
    pub fn describe(&self) -> Vec<Arc<Desc>> {
        self.sources.iter().flat_map(|s| s.describe()).collect()
    }

    /// Scrape every source, giving up on each after `timeout`.
    pub async fn collect(&self, timeout: Duration) -> Vec<Sample> {
        self.collect_until(Instant::now() + timeout).await
    }

    /// Scrape every source, giving up on each at `deadline`.
    ///
    /// Never fails: sources that error, time out or panic contribute nothing.
    pub async fn collect_until(&self, deadline: Instant) -> Vec<Sample> {
        let mut tasks = JoinSet::new();

        for source in &self.sources {
            let source = Arc::clone(source);
            tasks.spawn(async move {
                let start = Instant::now();
                match timeout_at(deadline, source.collect(deadline)).await {
                    Ok(samples) => {
                        tracing::debug!(
                            subsystem = %source.subsystem(),
                            samples = samples.len(),
                            duration_ms = start.elapsed().as_millis(),
                            "Source collected"
                        );
                        samples
                    }
                    Err(_) => {
                        tracing::warn!(
                            subsystem = %source.subsystem(),
                            "Source exceeded scrape deadline"
                        );
                        Vec::new()
                    }
                }
            });
        }

        let mut samples = Vec::new();
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(batch) => samples.extend(batch),
                Err(e) => tracing::error!(error = %e, "Source task failed"),
            }
        }
        samples
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.subsystem()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
