//! Metric registry built from schema metadata.
//!
//! A [`RegistryBuilder`] turns a static [`FieldMeta`] table into an immutable
//! [`Registry`] once at startup. Descriptors are deduplicated by
//! fully-qualified name across every registry the same builder produces, so
//! fields that share a metric name (one per phase, one per sensor) share one
//! [`Desc`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use prometheus::core::Desc;
use thiserror::Error;

use crate::collector::ValueType;
use crate::schema::{Conversion, FieldMeta, FieldValue, MetricType, Record};

/// Errors in a schema table. All of them are programming errors and must stop
/// the process before it serves metrics.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Field declares neither counter nor gauge.
    #[error("field '{field}': unknown metric type")]
    UnknownMetricType { field: String },

    /// Label template entry is not a `key:value` pair with a non-empty key.
    #[error("field '{field}': invalid label '{label}'")]
    InvalidLabel { field: String, label: String },

    /// Field reuses a metric name with different label keys.
    #[error("metric '{name}': label keys {found:?} do not match {expected:?}")]
    LabelMismatch {
        name: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Field reuses a metric name with a different metric kind.
    #[error("metric '{name}': kind {found:?} does not match {expected:?}")]
    KindMismatch {
        name: String,
        expected: ValueType,
        found: ValueType,
    },

    /// Two fields resolve to the same metric name and static label values.
    #[error("metric '{name}': duplicate series with labels {labels:?}")]
    DuplicateSeries { name: String, labels: Vec<String> },

    /// Metric or label name rejected by the exposition library.
    #[error("metric '{name}': {source}")]
    Descriptor {
        name: String,
        #[source]
        source: prometheus::Error,
    },
}

/// Value of one label, fixed or taken from the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelValue {
    /// Literal value from the template.
    Static(String),
    /// Text of the named record field at collection time.
    Field(String),
}

impl LabelValue {
    fn parse(value: &str) -> Self {
        match value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
            Some(field) if !field.is_empty() => Self::Field(field.to_string()),
            _ => Self::Static(value.to_string()),
        }
    }

    /// Resolve against the fields of a fetched record.
    pub fn resolve(&self, fields: &HashMap<&str, &FieldValue>) -> String {
        match self {
            Self::Static(v) => v.clone(),
            Self::Field(name) => fields
                .get(name.as_str())
                .map(|v| v.to_label())
                .unwrap_or_default(),
        }
    }
}

/// How one registered field is emitted.
#[derive(Debug, Clone)]
pub struct ExportRule {
    pub desc: Arc<Desc>,
    pub value_type: ValueType,
    pub labels: Vec<LabelValue>,
    pub conversion: Conversion,
}

/// Registry entry for one field.
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    /// Known to the schema, never described or emitted.
    Skip,
    /// Exported field.
    Export(ExportRule),
}

/// Immutable mapping from field identity to its export rule.
#[derive(Debug, Clone)]
pub struct Registry {
    subsystem: String,
    entries: HashMap<&'static str, RegistryEntry>,
}

impl Registry {
    /// Subsystem the registry was built for.
    pub fn subsystem(&self) -> &str {
        &self.subsystem
    }

    /// Look up a field by its JSON name.
    pub fn get(&self, field: &str) -> Option<&RegistryEntry> {
        self.entries.get(field)
    }

    /// Number of entries, skipped ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the schema exported nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One descriptor per exported field. Shared descriptors repeat.
    pub fn descriptors(&self) -> Vec<Arc<Desc>> {
        self.entries
            .values()
            .filter_map(|entry| match entry {
                RegistryEntry::Export(rule) => Some(Arc::clone(&rule.desc)),
                RegistryEntry::Skip => None,
            })
            .collect()
    }
}

/// Build a fully-qualified metric name from its non-empty parts.
///
/// An empty `name` yields an empty result.
pub fn fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    [namespace, subsystem, name]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Builds registries and owns the descriptor dedup table.
#[derive(Debug)]
pub struct RegistryBuilder {
    namespace: String,
    descs: HashMap<String, (Arc<Desc>, ValueType)>,
}

impl RegistryBuilder {
    /// Create a builder for metrics under `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            descs: HashMap::new(),
        }
    }

    /// Namespace prefix of every metric built.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Build the registry for record type `R`.
    pub fn build_for<R: Record>(&mut self, subsystem: &str) -> Result<Registry, SchemaError> {
        self.build(subsystem, R::FIELDS)
    }

    /// Build a registry from a metadata table.
    ///
    /// # Errors
    /// Returns `SchemaError` on an unspecified metric type, a malformed label
    /// template or an invalid metric name. A reused name must keep its label
    /// keys and metric kind, and must not repeat a series with identical
    /// static label values.
    pub fn build(
        &mut self,
        subsystem: &str,
        fields: &'static [FieldMeta],
    ) -> Result<Registry, SchemaError> {
        let mut entries = HashMap::with_capacity(fields.len());
        let mut series = HashSet::new();

        for meta in fields {
            if meta.name.is_empty() {
                continue;
            }
            if meta.skip {
                entries.insert(meta.field, RegistryEntry::Skip);
                continue;
            }

            let value_type = match meta.kind {
                MetricType::Counter => ValueType::Counter,
                MetricType::Gauge => ValueType::Gauge,
                MetricType::Unspecified => {
                    return Err(SchemaError::UnknownMetricType {
                        field: meta.field.to_string(),
                    });
                }
            };

            let (keys, labels) = parse_labels(meta)?;
            let desc = self.descriptor(subsystem, meta, keys, value_type)?;

            // Placeholder labels vary per scrape and cannot be checked here.
            let statics: Option<Vec<String>> = labels
                .iter()
                .map(|label| match label {
                    LabelValue::Static(v) => Some(v.clone()),
                    LabelValue::Field(_) => None,
                })
                .collect();
            if let Some(statics) = statics {
                if !series.insert((desc.fq_name.clone(), statics.clone())) {
                    return Err(SchemaError::DuplicateSeries {
                        name: desc.fq_name.clone(),
                        labels: statics,
                    });
                }
            }

            entries.insert(
                meta.field,
                RegistryEntry::Export(ExportRule {
                    desc,
                    value_type,
                    labels,
                    conversion: meta.conversion,
                }),
            );
        }

        tracing::debug!(
            namespace = %self.namespace,
            subsystem,
            entries = entries.len(),
            "Registry built"
        );

        Ok(Registry {
            subsystem: subsystem.to_string(),
            entries,
        })
    }

    // --- Private helpers ---

    fn descriptor(
        &mut self,
        subsystem: &str,
        meta: &FieldMeta,
        keys: Vec<String>,
        value_type: ValueType,
    ) -> Result<Arc<Desc>, SchemaError> {
        let name = fq_name(&self.namespace, subsystem, meta.name);

        if let Some((desc, kind)) = self.descs.get(&name) {
            if desc.variable_labels != keys {
                return Err(SchemaError::LabelMismatch {
                    name,
                    expected: desc.variable_labels.clone(),
                    found: keys,
                });
            }
            if *kind != value_type {
                return Err(SchemaError::KindMismatch {
                    name,
                    expected: *kind,
                    found: value_type,
                });
            }
            return Ok(Arc::clone(desc));
        }

        let desc = Desc::new(name.clone(), meta.help.to_string(), keys, HashMap::new())
            .map_err(|source| SchemaError::Descriptor {
                name: name.clone(),
                source,
            })?;
        let desc = Arc::new(desc);
        self.descs.insert(name, (Arc::clone(&desc), value_type));
        Ok(desc)
    }
}

fn parse_labels(meta: &FieldMeta) -> Result<(Vec<String>, Vec<LabelValue>), SchemaError> {
    meta.labels
        .iter()
        .map(|label| {
            let (key, value) = label
                .split_once(':')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| SchemaError::InvalidLabel {
                    field: meta.field.to_string(),
                    label: (*label).to_string(),
                })?;
            Ok::<_, SchemaError>((key.to_string(), LabelValue::parse(value)))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|pairs| pairs.into_iter().unzip())
}
