//! Schema-driven metric source.
//!
//! Pairs one [`Registry`] with one [`Fetcher`] and turns every fetched record
//! into samples field by field.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use prometheus::core::Desc;
use tokio::time::{Instant, timeout_at};

use crate::collector::registry::{Registry, RegistryBuilder, RegistryEntry, SchemaError};
use crate::collector::{Fetcher, MetricSource, Sample};
use crate::schema::{FieldValue, Record};

/// Metric source for one device endpoint.
pub struct SchemaSource<R, F> {
    registry: Arc<Registry>,
    fetcher: F,
    _record: PhantomData<fn() -> R>,
}

impl<R, F> SchemaSource<R, F>
where
    R: Record,
    F: Fetcher<R>,
{
    /// Create a source from a prebuilt registry.
    pub fn new(registry: impl Into<Arc<Registry>>, fetcher: F) -> Self {
        Self {
            registry: registry.into(),
            fetcher,
            _record: PhantomData,
        }
    }

    /// Build the registry for `R` under `subsystem` and wrap it in a source.
    ///
    /// # Errors
    /// Returns `SchemaError` if the record's metadata table is invalid.
    pub fn build(
        builder: &mut RegistryBuilder,
        subsystem: &str,
        fetcher: F,
    ) -> Result<Self, SchemaError> {
        let registry = builder.build_for::<R>(subsystem)?;
        Ok(Self::new(registry, fetcher))
    }

    /// The registry this source emits from.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Convert one record into samples.
    ///
    /// Fields without a registry entry are ignored, as are registered fields
    /// whose value is not numeric.
    pub fn emit(&self, record: &R) -> Vec<Sample> {
        let subsystem = self.registry.subsystem();
        let fields = match record.field_values() {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!(subsystem, error = %e, "Failed to read record fields");
                return Vec::new();
            }
        };
        let lookup: HashMap<&str, &FieldValue> =
            fields.iter().map(|(k, v)| (k.as_str(), v)).collect();

        let mut samples = Vec::with_capacity(fields.len());
        for (field, value) in &fields {
            let rule = match self.registry.get(field) {
                Some(RegistryEntry::Export(rule)) => rule,
                Some(RegistryEntry::Skip) => continue,
                None => {
                    tracing::debug!(
                        subsystem,
                        field = %field,
                        kind = value.kind(),
                        "Unknown field"
                    );
                    continue;
                }
            };

            let Some(raw) = value.as_f64() else {
                tracing::warn!(
                    subsystem,
                    field = %field,
                    kind = value.kind(),
                    "Unsupported field type"
                );
                continue;
            };

            samples.push(Sample {
                desc: Arc::clone(&rule.desc),
                value_type: rule.value_type,
                value: rule.conversion.apply(raw),
                label_values: rule.labels.iter().map(|l| l.resolve(&lookup)).collect(),
            });
        }
        samples
    }
}

impl<R, F> std::fmt::Debug for SchemaSource<R, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaSource")
            .field("subsystem", &self.registry.subsystem())
            .field("entries", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<R, F> MetricSource for SchemaSource<R, F>
where
    R: Record,
    F: Fetcher<R>,
{
    fn subsystem(&self) -> &str {
        self.registry.subsystem()
    }

    fn describe(&self) -> Vec<Arc<Desc>> {
        self.registry.descriptors()
    }

    async fn collect(&self, deadline: Instant) -> Vec<Sample> {
        match timeout_at(deadline, self.fetcher.fetch(deadline)).await {
            Ok(Ok(record)) => self.emit(&record),
            Ok(Err(e)) => {
                tracing::warn!(subsystem = %self.subsystem(), error = %e, "Fetch failed");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!(subsystem = %self.subsystem(), "Fetch timed out");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{FetchError, ValueType, fetch_fn};
    use crate::schema::{FieldMeta, Lifetime, Vitals};
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct Reading {
        grid_voltage: f64,
        #[serde(rename = "no-metadata-field")]
        no_metadata_field: String,
        session_seconds: i64,
        skip_me: f64,
    }

    static READING_FIELDS: &[FieldMeta] = &[
        FieldMeta::gauge("grid_voltage", "grid_voltage", "Grid voltage."),
        FieldMeta::counter("session_seconds", "session_seconds", "Session length."),
        FieldMeta::gauge("skip_me", "skip_me", "Never exported.").skipped(),
    ];

    impl Record for Reading {
        const FIELDS: &'static [FieldMeta] = READING_FIELDS;
    }

    fn reading() -> Reading {
        Reading {
            grid_voltage: 240.1,
            no_metadata_field: "x".to_string(),
            session_seconds: 120,
            skip_me: 99.0,
        }
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(1)
    }

    fn find<'a>(samples: &'a [Sample], name: &str) -> Vec<&'a Sample> {
        samples.iter().filter(|s| s.name() == name).collect()
    }

    #[tokio::test]
    async fn test_collect_emits_registered_fields_only() {
        let mut builder = RegistryBuilder::new("wallconnector");
        let source = SchemaSource::build(
            &mut builder,
            "vitals",
            fetch_fn(|_: Instant| async { Ok::<_, FetchError>(reading()) }),
        )
        .unwrap();

        let samples = source.collect(deadline()).await;
        assert_eq!(samples.len(), 2);

        let voltage = find(&samples, "wallconnector_vitals_grid_voltage");
        assert_eq!(voltage.len(), 1);
        assert_eq!(voltage[0].value_type, ValueType::Gauge);
        assert_eq!(voltage[0].value, 240.1);

        let session = find(&samples, "wallconnector_vitals_session_seconds");
        assert_eq!(session.len(), 1);
        assert_eq!(session[0].value_type, ValueType::Counter);
        assert_eq!(session[0].value, 120.0);

        assert!(find(&samples, "wallconnector_vitals_skip_me").is_empty());
    }

    #[tokio::test]
    async fn test_describe_excludes_skipped() {
        let mut builder = RegistryBuilder::new("wallconnector");
        let source = SchemaSource::build(
            &mut builder,
            "vitals",
            fetch_fn(|_: Instant| async { Err::<Reading, _>(FetchError::Timeout) }),
        )
        .unwrap();

        let mut names: Vec<_> = source.describe().iter().map(|d| d.fq_name.clone()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "wallconnector_vitals_grid_voltage",
                "wallconnector_vitals_session_seconds",
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_error_yields_no_samples() {
        let mut builder = RegistryBuilder::new("wallconnector");
        let source = SchemaSource::build(
            &mut builder,
            "vitals",
            fetch_fn(|_: Instant| async { Err::<Reading, _>(FetchError::Status(500)) }),
        )
        .unwrap();

        assert!(source.collect(deadline()).await.is_empty());
        assert_eq!(source.describe().len(), 2);
    }

    #[tokio::test]
    async fn test_deadline_aborts_slow_fetch() {
        let mut builder = RegistryBuilder::new("wallconnector");
        let source = SchemaSource::build(
            &mut builder,
            "vitals",
            fetch_fn(|_: Instant| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, FetchError>(reading())
            }),
        )
        .unwrap();

        let start = Instant::now();
        let samples = source
            .collect(Instant::now() + Duration::from_millis(50))
            .await;
        assert!(samples.is_empty());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unsupported_registered_field_is_skipped() {
        #[derive(Debug, Clone, Default, Serialize, Deserialize)]
        struct Mislabeled {
            grid_voltage: f64,
            firmware: String,
        }

        static MISLABELED_FIELDS: &[FieldMeta] = &[
            FieldMeta::gauge("grid_voltage", "grid_voltage", "Grid voltage."),
            FieldMeta::gauge("firmware", "firmware", "Not numeric."),
        ];

        impl Record for Mislabeled {
            const FIELDS: &'static [FieldMeta] = MISLABELED_FIELDS;
        }

        let registry = RegistryBuilder::new("wallconnector")
            .build_for::<Mislabeled>("version")
            .unwrap();
        let source = SchemaSource::new(
            registry,
            fetch_fn(|_: Instant| async {
                Ok::<_, FetchError>(Mislabeled {
                    grid_voltage: 230.0,
                    firmware: "24.28.3".into(),
                })
            }),
        );

        let samples = source.collect(deadline()).await;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name(), "wallconnector_version_grid_voltage");
        // Still described; only the value is unusable.
        assert_eq!(source.describe().len(), 2);
    }

    #[test]
    fn test_vitals_conversions_and_labels() {
        let registry = RegistryBuilder::new("wallconnector")
            .build_for::<Vitals>("vitals")
            .unwrap();
        let source = SchemaSource::new(
            registry,
            fetch_fn(|_: Instant| async { Ok::<_, FetchError>(Vitals::default()) }),
        );

        let samples = source.emit(&Vitals {
            session_energy_wh: 1.0,
            current_a_a: 16.0,
            current_c_a: 15.5,
            contactor_closed: true,
            ..Default::default()
        });

        let energy = find(&samples, "wallconnector_vitals_session_energy_joules");
        assert_eq!(energy[0].value, 3600.0);

        let contactor = find(&samples, "wallconnector_vitals_contactor_closed");
        assert_eq!(contactor[0].value, 1.0);

        let currents = find(&samples, "wallconnector_vitals_current_amps");
        assert_eq!(currents.len(), 4);
        let phase_c = currents
            .iter()
            .find(|s| s.label_values == vec!["c".to_string()])
            .unwrap();
        assert_eq!(phase_c.value, 15.5);

        // Lists are skipped by the schema.
        assert_eq!(samples.len(), 25);
    }

    #[test]
    fn test_lifetime_energy_in_joules() {
        let registry = RegistryBuilder::new("wallconnector")
            .build_for::<Lifetime>("lifetime")
            .unwrap();
        let source = SchemaSource::new(
            registry,
            fetch_fn(|_: Instant| async { Ok::<_, FetchError>(Lifetime::default()) }),
        );

        let samples = source.emit(&Lifetime {
            energy_wh: 2.0,
            ..Default::default()
        });
        let energy = find(&samples, "wallconnector_lifetime_energy_joules_total");
        assert_eq!(energy[0].value, 7200.0);
        assert_eq!(energy[0].value_type, ValueType::Counter);
    }
}
