//! `/api/1/wifi_status`: wireless link quality.

use serde::{Deserialize, Serialize};

use super::{FieldMeta, Record};

/// Wifi status of the wall connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wifi {
    pub wifi_ssid: String,
    pub wifi_signal_strength: i64,
    pub wifi_rssi: i64,
    pub wifi_snr: i64,
    pub wifi_connected: bool,
    pub wifi_infra_ip: String,
    pub internet: bool,
    pub wifi_mac: String,
}

/// Export metadata for [`Wifi`].
///
/// Address fields are not exported.
pub static WIFI_FIELDS: &[FieldMeta] = &[
    FieldMeta::gauge(
        "wifi_signal_strength",
        "signal_strength_percent",
        "Wifi signal strength in percent.",
    ),
    FieldMeta::gauge("wifi_rssi", "rssi_dbm", "Received signal strength in dBm."),
    FieldMeta::gauge("wifi_snr", "snr_db", "Signal to noise ratio in dB."),
    FieldMeta::gauge(
        "wifi_connected",
        "connected",
        "Whether the wifi link is up.",
    )
    .with_labels(&["ssid:{wifi_ssid}"]),
    FieldMeta::gauge(
        "internet",
        "internet_connected",
        "Whether the internet is reachable.",
    ),
];

impl Record for Wifi {
    const FIELDS: &'static [FieldMeta] = WIFI_FIELDS;
}
