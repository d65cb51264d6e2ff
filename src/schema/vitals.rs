//! `/api/1/vitals`: live electrical and thermal readings.

use serde::{Deserialize, Serialize};

use super::{Conversion, FieldMeta, Record};

/// Current vitals of the wall connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vitals {
    pub contactor_closed: bool,
    pub vehicle_connected: bool,
    pub session_s: i64,
    pub grid_v: f64,
    pub grid_hz: f64,
    pub vehicle_current_a: f64,
    #[serde(rename = "currentA_a")]
    pub current_a_a: f64,
    #[serde(rename = "currentB_a")]
    pub current_b_a: f64,
    #[serde(rename = "currentC_a")]
    pub current_c_a: f64,
    #[serde(rename = "currentN_a")]
    pub current_n_a: f64,
    #[serde(rename = "voltageA_v")]
    pub voltage_a_v: f64,
    #[serde(rename = "voltageB_v")]
    pub voltage_b_v: f64,
    #[serde(rename = "voltageC_v")]
    pub voltage_c_v: f64,
    pub relay_coil_v: f64,
    pub pcba_temp_c: f64,
    pub handle_temp_c: f64,
    pub mcu_temp_c: f64,
    pub uptime_s: i64,
    pub input_thermopile_uv: i64,
    pub prox_v: f64,
    pub pilot_high_v: f64,
    pub pilot_low_v: f64,
    pub session_energy_wh: f64,
    pub config_status: i64,
    pub evse_state: i64,
    pub current_alerts: Vec<String>,
    pub evse_not_ready_reasons: Vec<i64>,
}

/// Export metadata for [`Vitals`].
pub static VITALS_FIELDS: &[FieldMeta] = &[
    FieldMeta::gauge(
        "contactor_closed",
        "contactor_closed",
        "Whether the contactor is closed.",
    ),
    FieldMeta::gauge(
        "vehicle_connected",
        "vehicle_connected",
        "Whether a vehicle is plugged in.",
    ),
    FieldMeta::counter(
        "session_s",
        "session_seconds",
        "Duration of the current charging session in seconds.",
    ),
    FieldMeta::gauge("grid_v", "grid_voltage", "Grid voltage in volts."),
    FieldMeta::gauge("grid_hz", "grid_frequency_hertz", "Grid frequency in hertz."),
    FieldMeta::gauge(
        "vehicle_current_a",
        "vehicle_current_amps",
        "Current drawn by the vehicle in amps.",
    ),
    FieldMeta::gauge("currentA_a", "current_amps", "Phase current in amps.")
        .with_labels(&["phase:a"]),
    FieldMeta::gauge("currentB_a", "current_amps", "Phase current in amps.")
        .with_labels(&["phase:b"]),
    FieldMeta::gauge("currentC_a", "current_amps", "Phase current in amps.")
        .with_labels(&["phase:c"]),
    FieldMeta::gauge("currentN_a", "current_amps", "Phase current in amps.")
        .with_labels(&["phase:n"]),
    FieldMeta::gauge("voltageA_v", "phase_voltage", "Phase voltage in volts.")
        .with_labels(&["phase:a"]),
    FieldMeta::gauge("voltageB_v", "phase_voltage", "Phase voltage in volts.")
        .with_labels(&["phase:b"]),
    FieldMeta::gauge("voltageC_v", "phase_voltage", "Phase voltage in volts.")
        .with_labels(&["phase:c"]),
    FieldMeta::gauge(
        "relay_coil_v",
        "relay_coil_voltage",
        "Relay coil voltage in volts.",
    ),
    FieldMeta::gauge("pcba_temp_c", "temperature_celsius", "Temperature in celsius.")
        .with_labels(&["sensor:pcba"]),
    FieldMeta::gauge(
        "handle_temp_c",
        "temperature_celsius",
        "Temperature in celsius.",
    )
    .with_labels(&["sensor:handle"]),
    FieldMeta::gauge("mcu_temp_c", "temperature_celsius", "Temperature in celsius.")
        .with_labels(&["sensor:mcu"]),
    FieldMeta::counter(
        "uptime_s",
        "uptime_seconds",
        "Time since the wall connector booted in seconds.",
    ),
    FieldMeta::gauge(
        "input_thermopile_uv",
        "input_thermopile_microvolts",
        "Input thermopile reading in microvolts.",
    ),
    FieldMeta::gauge("prox_v", "proximity_voltage", "Proximity pin voltage in volts."),
    FieldMeta::gauge("pilot_high_v", "pilot_voltage", "Pilot signal voltage in volts.")
        .with_labels(&["level:high"]),
    FieldMeta::gauge("pilot_low_v", "pilot_voltage", "Pilot signal voltage in volts.")
        .with_labels(&["level:low"]),
    FieldMeta::counter(
        "session_energy_wh",
        "session_energy_joules",
        "Energy delivered during the current session in joules.",
    )
    .with_conversion(Conversion::WH_TO_J),
    FieldMeta::gauge("config_status", "config_status", "Configuration status code."),
    FieldMeta::gauge("evse_state", "evse_state", "EVSE state machine code."),
    FieldMeta::gauge("current_alerts", "current_alerts", "Active alerts.").skipped(),
    FieldMeta::gauge(
        "evse_not_ready_reasons",
        "evse_not_ready_reasons",
        "Reasons the EVSE is not ready.",
    )
    .skipped(),
];

impl Record for Vitals {
    const FIELDS: &'static [FieldMeta] = VITALS_FIELDS;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vitals_decode() {
        let body = r#"{
            "contactor_closed": true,
            "vehicle_connected": true,
            "session_s": 3600,
            "grid_v": 241.3,
            "grid_hz": 59.98,
            "currentA_a": 31.8,
            "session_energy_wh": 10980.4,
            "current_alerts": [],
            "unknown_future_field": 1
        }"#;

        let vitals: Vitals = serde_json::from_str(body).unwrap();
        assert!(vitals.contactor_closed);
        assert_eq!(vitals.session_s, 3600);
        assert_eq!(vitals.current_a_a, 31.8);
        assert_eq!(vitals.uptime_s, 0);
    }

    #[test]
    fn test_vitals_field_values_use_wire_names() {
        let vitals = Vitals {
            current_b_a: 12.5,
            ..Default::default()
        };
        let values = vitals.field_values().unwrap();
        assert!(
            values
                .iter()
                .any(|(k, v)| k == "currentB_a" && v.as_f64() == Some(12.5))
        );
    }
}
