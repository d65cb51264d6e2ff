//! `/api/1/lifetime`: counters accumulated since installation.

use serde::{Deserialize, Serialize};

use super::{Conversion, FieldMeta, Record};

/// Lifetime statistics of the wall connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lifetime {
    pub contactor_cycles: i64,
    pub contactor_cycles_loaded: i64,
    pub alert_count: i64,
    pub thermal_foldbacks: i64,
    pub avg_startup_temp: f64,
    pub charge_starts: i64,
    pub energy_wh: f64,
    pub connector_cycles: i64,
    pub uptime_s: i64,
    pub charging_time_s: i64,
}

/// Export metadata for [`Lifetime`].
pub static LIFETIME_FIELDS: &[FieldMeta] = &[
    FieldMeta::counter(
        "contactor_cycles",
        "contactor_cycles_total",
        "Number of contactor cycles.",
    ),
    FieldMeta::counter(
        "contactor_cycles_loaded",
        "contactor_cycles_loaded_total",
        "Number of contactor cycles under load.",
    ),
    FieldMeta::counter("alert_count", "alerts_total", "Number of alerts raised."),
    FieldMeta::counter(
        "thermal_foldbacks",
        "thermal_foldbacks_total",
        "Number of thermal foldback events.",
    ),
    FieldMeta::gauge(
        "avg_startup_temp",
        "average_startup_temperature_celsius",
        "Average temperature at startup in celsius.",
    ),
    FieldMeta::counter(
        "charge_starts",
        "charge_starts_total",
        "Number of charging sessions started.",
    ),
    FieldMeta::counter(
        "energy_wh",
        "energy_joules_total",
        "Energy delivered in joules.",
    )
    .with_conversion(Conversion::WH_TO_J),
    FieldMeta::counter(
        "connector_cycles",
        "connector_cycles_total",
        "Number of times a connector was plugged in.",
    ),
    FieldMeta::counter(
        "uptime_s",
        "uptime_seconds_total",
        "Total time powered on in seconds.",
    ),
    FieldMeta::counter(
        "charging_time_s",
        "charging_seconds_total",
        "Total time spent charging in seconds.",
    ),
];

impl Record for Lifetime {
    const FIELDS: &'static [FieldMeta] = LIFETIME_FIELDS;
}
