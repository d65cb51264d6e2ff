//! HTTP client for the Wall Connector's local API.
//!
//! Each call issues one GET and decodes the JSON body into a typed record.

use std::marker::PhantomData;
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;

use crate::collector::{
    Collector, FetchError, Fetcher, RegistryBuilder, SchemaError, SchemaSource, UptimeSource,
};
use crate::schema::{Lifetime, Record, Version, Vitals, Wifi};

/// Metric namespace for every device metric.
pub const NAMESPACE: &str = "wallconnector";

pub const VITALS_PATH: &str = "/api/1/vitals";
pub const LIFETIME_PATH: &str = "/api/1/lifetime";
pub const VERSION_PATH: &str = "/api/1/version";
pub const WIFI_PATH: &str = "/api/1/wifi_status";

/// Default device address.
pub const DEFAULT_ADDR: &str = "localhost:8081";

/// Default request timeout (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors returned by [`Client`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Request failed before a response arrived.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Device answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Body was not valid JSON for the record.
    #[error("failed to decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Deadline already passed.
    #[error("deadline elapsed before request to {url}")]
    Deadline { url: String },
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Status { status, .. } => FetchError::Status(status),
            ClientError::Decode { .. } => FetchError::Decode(err.to_string()),
            ClientError::Deadline { .. } => FetchError::Timeout,
            ClientError::Request { ref source, .. } if source.is_timeout() => FetchError::Timeout,
            ClientError::Build(_) | ClientError::Request { .. } => {
                FetchError::Transport(err.to_string())
            }
        }
    }
}

/// Connection settings for the device.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Device address as `host:port` (default: "localhost:8081").
    pub addr: String,
    /// URL scheme (default: http).
    pub scheme: String,
    /// Request timeout (default: 10s).
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDR)
    }
}

impl ClientConfig {
    /// Create a configuration for the device at `addr`.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            scheme: "http".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the URL scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Base URL of the device API.
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.scheme, self.addr)
    }
}

/// Wall Connector API client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    http: HttpClient,
}

impl Client {
    /// Create a client.
    ///
    /// # Errors
    /// Returns `ClientError::Build` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { config, http })
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Current vitals.
    pub async fn vitals(&self, deadline: Instant) -> Result<Vitals, ClientError> {
        self.get(VITALS_PATH, deadline).await
    }

    /// Lifetime statistics.
    pub async fn lifetime(&self, deadline: Instant) -> Result<Lifetime, ClientError> {
        self.get(LIFETIME_PATH, deadline).await
    }

    /// Firmware and hardware identity.
    pub async fn version(&self, deadline: Instant) -> Result<Version, ClientError> {
        self.get(VERSION_PATH, deadline).await
    }

    /// Wifi link status.
    pub async fn wifi(&self, deadline: Instant) -> Result<Wifi, ClientError> {
        self.get(WIFI_PATH, deadline).await
    }

    /// A [`Fetcher`] for record type `R` served at `path`.
    pub fn endpoint<R: Record>(&self, path: &'static str) -> ApiEndpoint<R> {
        ApiEndpoint {
            client: self.clone(),
            path,
            _record: PhantomData,
        }
    }

    async fn get<T>(&self, path: &str, deadline: Instant) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url(), path);

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ClientError::Deadline { url });
        }

        let response = self
            .http
            .get(&url)
            .timeout(remaining.min(self.config.timeout))
            .send()
            .await
            .map_err(|source| ClientError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let record = response
            .json::<T>()
            .await
            .map_err(|source| ClientError::Decode {
                url: url.clone(),
                source,
            })?;

        tracing::debug!(url = %url, "Fetched record");
        Ok(record)
    }
}

/// One device endpoint, usable as a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct ApiEndpoint<R> {
    client: Client,
    path: &'static str,
    _record: PhantomData<fn() -> R>,
}

impl<R> ApiEndpoint<R> {
    /// API path of the endpoint.
    pub fn path(&self) -> &'static str {
        self.path
    }
}

#[async_trait::async_trait]
impl<R: Record> Fetcher<R> for ApiEndpoint<R> {
    async fn fetch(&self, deadline: Instant) -> Result<R, FetchError> {
        Ok(self.client.get(self.path, deadline).await?)
    }
}

/// Collector with the standard Wall Connector sources: vitals, lifetime,
/// wifi and exporter uptime.
///
/// # Errors
/// Returns `SchemaError` if a schema table is invalid.
pub fn wallconnector_collector(client: &Client) -> Result<Collector, SchemaError> {
    let mut builder = RegistryBuilder::new(NAMESPACE);

    let collector = Collector::new()
        .with_source(SchemaSource::build(
            &mut builder,
            "vitals",
            client.endpoint::<Vitals>(VITALS_PATH),
        )?)
        .with_source(SchemaSource::build(
            &mut builder,
            "lifetime",
            client.endpoint::<Lifetime>(LIFETIME_PATH),
        )?)
        .with_source(SchemaSource::build(
            &mut builder,
            "wifi",
            client.endpoint::<Wifi>(WIFI_PATH),
        )?)
        .with_source(UptimeSource::new()?);

    Ok(collector)
}
