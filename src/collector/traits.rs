//! Core collector traits and types.

use std::future::Future;
use std::sync::Arc;

use prometheus::core::Desc;
use thiserror::Error;
use tokio::time::Instant;

/// Errors returned by a [`Fetcher`].
///
/// A fetch error never fails a scrape: the source that hit it contributes no
/// samples for that cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Deadline elapsed before the record arrived.
    #[error("timeout elapsed")]
    Timeout,

    /// Request could not be sent or the response not read.
    #[error("transport error: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// Response body did not match the record shape.
    #[error("decode error: {0}")]
    Decode(String),
}

/// Kind of an emitted sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Counter,
    Gauge,
}

impl ValueType {
    /// Prometheus protobuf metric type.
    pub fn metric_type(self) -> prometheus::proto::MetricType {
        match self {
            Self::Counter => prometheus::proto::MetricType::COUNTER,
            Self::Gauge => prometheus::proto::MetricType::GAUGE,
        }
    }
}

/// One metric value produced during a scrape.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Shared descriptor of the metric.
    pub desc: Arc<Desc>,
    /// Counter or gauge.
    pub value_type: ValueType,
    /// Converted value.
    pub value: f64,
    /// Values for `desc.variable_labels`, in the same order.
    pub label_values: Vec<String>,
}

impl Sample {
    /// Fully-qualified metric name.
    pub fn name(&self) -> &str {
        &self.desc.fq_name
    }

    /// Label keys zipped with their values.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.desc
            .variable_labels
            .iter()
            .map(String::as_str)
            .zip(self.label_values.iter().map(String::as_str))
    }
}

/// Capability returning one fresh record per call.
///
/// Implementations must give up once `deadline` has passed and must surface
/// decoding problems as [`FetchError::Decode`].
#[async_trait::async_trait]
pub trait Fetcher<R>: Send + Sync + 'static {
    /// Fetch one record.
    async fn fetch(&self, deadline: Instant) -> Result<R, FetchError>;
}

/// [`Fetcher`] backed by an async closure.
#[derive(Clone)]
pub struct FnFetcher<F>(F);

/// Wrap an async closure as a [`Fetcher`].
///
/// ```rust
/// use tokio::time::Instant;
/// use wallconnector::collector::{FetchError, fetch_fn};
/// use wallconnector::schema::Vitals;
///
/// let fetcher = fetch_fn(|_deadline: Instant| async { Ok::<_, FetchError>(Vitals::default()) });
/// # let _ = fetcher;
/// ```
pub fn fetch_fn<F>(f: F) -> FnFetcher<F> {
    FnFetcher(f)
}

#[async_trait::async_trait]
impl<R, F, Fut> Fetcher<R> for FnFetcher<F>
where
    R: Send + 'static,
    F: Fn(Instant) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, FetchError>> + Send,
{
    async fn fetch(&self, deadline: Instant) -> Result<R, FetchError> {
        (self.0)(deadline).await
    }
}

/// A source of samples scraped on demand.
///
/// # Error Handling Philosophy
///
/// `collect()` has no error path. A source that cannot reach its upstream
/// logs the failure and returns no samples, so one broken endpoint never
/// takes the rest of the scrape down with it.
#[async_trait::async_trait]
pub trait MetricSource: Send + Sync + 'static {
    /// Subsystem name, used for logging.
    fn subsystem(&self) -> &str;

    /// Every descriptor this source can emit, regardless of upstream health.
    fn describe(&self) -> Vec<Arc<Desc>>;

    /// Fetch fresh data and convert it into samples.
    async fn collect(&self, deadline: Instant) -> Vec<Sample>;
}
