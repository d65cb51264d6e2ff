//! Prometheus text exposition of scraped samples.

use std::collections::BTreeMap;

use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily};
use prometheus::{Encoder, TextEncoder};
use thiserror::Error;

use crate::collector::{Sample, ValueType};

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Errors produced while rendering samples.
#[derive(Debug, Error)]
pub enum ExpositionError {
    /// Text encoder rejected the metric families.
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),
}

/// Group samples into one metric family per fully-qualified name, sorted by
/// name.
pub fn metric_families(samples: &[Sample]) -> Vec<MetricFamily> {
    let mut families: BTreeMap<&str, MetricFamily> = BTreeMap::new();

    for sample in samples {
        let family = families.entry(sample.name()).or_insert_with(|| {
            let mut family = MetricFamily::default();
            family.set_name(sample.desc.fq_name.clone());
            family.set_help(sample.desc.help.clone());
            family.set_field_type(sample.value_type.metric_type());
            family
        });
        family.mut_metric().push(to_metric(sample));
    }

    families.into_values().collect()
}

/// Render samples in the text exposition format.
pub fn encode_text(samples: &[Sample]) -> Result<String, ExpositionError> {
    let families = metric_families(samples);
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn to_metric(sample: &Sample) -> Metric {
    let mut metric = Metric::default();
    for (name, value) in sample.labels() {
        let mut pair = LabelPair::default();
        pair.set_name(name.to_string());
        pair.set_value(value.to_string());
        metric.mut_label().push(pair);
    }

    match sample.value_type {
        ValueType::Counter => {
            let mut counter = Counter::default();
            counter.set_value(sample.value);
            metric.set_counter(counter);
        }
        ValueType::Gauge => {
            let mut gauge = Gauge::default();
            gauge.set_value(sample.value);
            metric.set_gauge(gauge);
        }
    }
    metric
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::core::Desc;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn desc(name: &str, help: &str, labels: &[&str]) -> Arc<Desc> {
        Arc::new(
            Desc::new(
                name.to_string(),
                help.to_string(),
                labels.iter().map(|l| l.to_string()).collect(),
                HashMap::new(),
            )
            .unwrap(),
        )
    }

    fn sample(desc: &Arc<Desc>, value_type: ValueType, value: f64, labels: &[&str]) -> Sample {
        Sample {
            desc: Arc::clone(desc),
            value_type,
            value,
            label_values: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_groups_samples_by_name() {
        let current = desc("wallconnector_vitals_current_amps", "Current.", &["phase"]);
        let uptime = desc("wallconnector_vitals_uptime_seconds", "Uptime.", &[]);
        let samples = vec![
            sample(&uptime, ValueType::Counter, 10.0, &[]),
            sample(&current, ValueType::Gauge, 16.0, &["a"]),
            sample(&current, ValueType::Gauge, 15.5, &["b"]),
        ];

        let families = metric_families(&samples);
        assert_eq!(families.len(), 2);
        assert_eq!(families[0].get_name(), "wallconnector_vitals_current_amps");
        assert_eq!(families[0].get_metric().len(), 2);
        assert_eq!(families[1].get_name(), "wallconnector_vitals_uptime_seconds");
        assert_eq!(
            families[1].get_field_type(),
            prometheus::proto::MetricType::COUNTER
        );
    }

    #[test]
    fn test_encode_text() {
        let voltage = desc("wallconnector_vitals_grid_voltage", "Grid voltage.", &[]);
        let current = desc("wallconnector_vitals_current_amps", "Current.", &["phase"]);
        let samples = vec![
            sample(&voltage, ValueType::Gauge, 240.1, &[]),
            sample(&current, ValueType::Gauge, 16.0, &["a"]),
        ];

        let text = encode_text(&samples).unwrap();
        assert!(text.contains("# HELP wallconnector_vitals_grid_voltage Grid voltage."));
        assert!(text.contains("# TYPE wallconnector_vitals_grid_voltage gauge"));
        assert!(text.contains("wallconnector_vitals_grid_voltage 240.1"));
        assert!(text.contains("wallconnector_vitals_current_amps{phase=\"a\"} 16"));
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode_text(&[]).unwrap(), "");
    }
}
