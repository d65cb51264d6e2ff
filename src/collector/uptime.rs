//! Process start and current time, for uptime graphs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use prometheus::core::Desc;
use tokio::time::Instant;

use crate::collector::registry::SchemaError;
use crate::collector::{MetricSource, Sample, ValueType};

const START_TIME_NAME: &str = "node_start_time_seconds";
const CURRENT_TIME_NAME: &str = "node_current_time_seconds";

/// Exports the exporter's own start time and the current wall-clock time.
#[derive(Debug, Clone)]
pub struct UptimeSource {
    started: DateTime<Utc>,
    start_desc: Arc<Desc>,
    current_desc: Arc<Desc>,
}

impl UptimeSource {
    /// Create a source that treats now as the process start time.
    pub fn new() -> Result<Self, SchemaError> {
        Self::started_at(Utc::now())
    }

    /// Create a source with an explicit start time.
    pub fn started_at(started: DateTime<Utc>) -> Result<Self, SchemaError> {
        Ok(Self {
            started,
            start_desc: descriptor(
                START_TIME_NAME,
                "Start time of the node since unix epoch in seconds.",
            )?,
            current_desc: descriptor(
                CURRENT_TIME_NAME,
                "Current time of the node since unix epoch in seconds.",
            )?,
        })
    }

    fn sample(desc: &Arc<Desc>, at: DateTime<Utc>) -> Sample {
        Sample {
            desc: Arc::clone(desc),
            value_type: ValueType::Counter,
            value: at.timestamp_millis() as f64 / 1000.0,
            label_values: Vec::new(),
        }
    }
}

fn descriptor(name: &str, help: &str) -> Result<Arc<Desc>, SchemaError> {
    Desc::new(name.to_string(), help.to_string(), Vec::new(), HashMap::new())
        .map(Arc::new)
        .map_err(|source| SchemaError::Descriptor {
            name: name.to_string(),
            source,
        })
}

#[async_trait::async_trait]
impl MetricSource for UptimeSource {
    fn subsystem(&self) -> &str {
        "uptime"
    }

    fn describe(&self) -> Vec<Arc<Desc>> {
        vec![Arc::clone(&self.start_desc), Arc::clone(&self.current_desc)]
    }

    async fn collect(&self, _deadline: Instant) -> Vec<Sample> {
        vec![
            Self::sample(&self.start_desc, self.started),
            Self::sample(&self.current_desc, Utc::now()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::Duration;

    #[tokio::test]
    async fn test_uptime_samples() {
        let started = Utc.timestamp_millis_opt(1_700_000_000_250).unwrap();
        let source = UptimeSource::started_at(started).unwrap();

        let samples = source
            .collect(Instant::now() + Duration::from_secs(1))
            .await;
        assert_eq!(samples.len(), 2);

        assert_eq!(samples[0].name(), START_TIME_NAME);
        assert_eq!(samples[0].value, 1_700_000_000.25);
        assert_eq!(samples[0].value_type, ValueType::Counter);

        assert_eq!(samples[1].name(), CURRENT_TIME_NAME);
        assert!(samples[1].value >= samples[0].value);
    }

    #[test]
    fn test_uptime_describe() {
        let source = UptimeSource::new().unwrap();
        let names: Vec<_> = source
            .describe()
            .iter()
            .map(|d| d.fq_name.clone())
            .collect();
        assert_eq!(names, vec![START_TIME_NAME, CURRENT_TIME_NAME]);
    }
}
