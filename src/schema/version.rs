//! `/api/1/version`: firmware and hardware identity.

use serde::{Deserialize, Serialize};

use super::{FieldMeta, Record};

/// Version information of the wall connector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    pub firmware_version: String,
    pub part_number: String,
    pub serial_number: String,
}

/// Version fields are text only and carry no metrics.
pub static VERSION_FIELDS: &[FieldMeta] = &[];

impl Record for Version {
    const FIELDS: &'static [FieldMeta] = VERSION_FIELDS;
}
