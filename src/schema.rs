//! Schema Layer
//!
//! Statically declared field metadata for every record the Wall Connector
//! API returns. Each record type pairs a serde struct (the wire shape) with a
//! `&'static [FieldMeta]` table describing how its fields are exported.
//!
//! # Components
//!
//! - [`FieldMeta`]: Per-field export metadata (name, help, kind, labels, conversion, skip)
//! - [`MetricType`]: Declared metric kind
//! - [`Conversion`]: Unit conversion applied before emission
//! - [`Record`]: Ties a record struct to its metadata table
//! - [`FieldValue`]: Tagged value of a single record field

mod lifetime;
mod value;
mod version;
mod vitals;
mod wifi;

use serde::Serialize;
use serde::de::DeserializeOwned;

pub use lifetime::{LIFETIME_FIELDS, Lifetime};
pub use value::FieldValue;
pub use version::{VERSION_FIELDS, Version};
pub use vitals::{VITALS_FIELDS, Vitals};
pub use wifi::{WIFI_FIELDS, Wifi};

/// Watt-hours to joules.
pub const WH_TO_JOULES: f64 = 3600.0;

/// Declared kind of an exported metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricType {
    /// Unset. Rejected when the registry is built.
    #[default]
    Unspecified,
    /// Monotonically increasing value.
    Counter,
    /// Point-in-time value.
    Gauge,
}

/// Numeric transform applied to a raw field value before it is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Conversion {
    /// Value is emitted unchanged.
    #[default]
    None,
    /// Value is emitted as `1 / v`. Zero yields `+Inf`.
    Inverse,
    /// Value is multiplied by the factor.
    Scale(f64),
}

impl Conversion {
    /// Energy in watt-hours exported as joules.
    pub const WH_TO_J: Self = Self::Scale(WH_TO_JOULES);

    /// Apply the conversion to a raw value.
    pub fn apply(self, v: f64) -> f64 {
        match self {
            Self::None => v,
            Self::Inverse => 1.0 / v,
            Self::Scale(factor) => v * factor,
        }
    }
}

/// Export metadata for one record field.
///
/// Tables of these are declared as statics next to each record type and are
/// never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldMeta {
    /// JSON key of the field in the record.
    pub field: &'static str,
    /// Metric name without namespace or subsystem. Empty means not exported.
    pub name: &'static str,
    /// Help text.
    pub help: &'static str,
    /// Metric kind.
    pub kind: MetricType,
    /// Label template, each entry `key:value`. A value written as `{field}`
    /// is taken from that record field at collection time.
    pub labels: &'static [&'static str],
    /// Conversion applied before emission.
    pub conversion: Conversion,
    /// Known to the schema but never exported.
    pub skip: bool,
}

impl FieldMeta {
    const fn new(
        field: &'static str,
        name: &'static str,
        help: &'static str,
        kind: MetricType,
    ) -> Self {
        Self {
            field,
            name,
            help,
            kind,
            labels: &[],
            conversion: Conversion::None,
            skip: false,
        }
    }

    /// Gauge exported under `name`.
    pub const fn gauge(field: &'static str, name: &'static str, help: &'static str) -> Self {
        Self::new(field, name, help, MetricType::Gauge)
    }

    /// Counter exported under `name`.
    pub const fn counter(field: &'static str, name: &'static str, help: &'static str) -> Self {
        Self::new(field, name, help, MetricType::Counter)
    }

    /// Set the label template.
    pub const fn with_labels(self, labels: &'static [&'static str]) -> Self {
        Self { labels, ..self }
    }

    /// Set the conversion rule.
    pub const fn with_conversion(self, conversion: Conversion) -> Self {
        Self { conversion, ..self }
    }

    /// Mark the field as known but not exported.
    pub const fn skipped(self) -> Self {
        Self { skip: true, ..self }
    }
}

/// A record returned by one device endpoint.
///
/// Field values are read through the record's serde representation, so no
/// per-field accessor code is needed.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Export metadata for the record's fields.
    const FIELDS: &'static [FieldMeta];

    /// Every top-level field of the record keyed by its JSON name.
    fn field_values(&self) -> Result<Vec<(String, FieldValue)>, serde_json::Error> {
        value::flatten(self)
    }
}
