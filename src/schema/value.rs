//! Tagged values of individual record fields.

use serde::Serialize;
use serde_json::Value;

/// Value of one top-level record field.
///
/// Only [`FieldValue::Float`], [`FieldValue::Int`] and [`FieldValue::Bool`]
/// can be emitted as samples.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    /// Array with its element count.
    List(usize),
    Object,
    Null,
}

impl FieldValue {
    /// Numeric value for emission. Booleans map to 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(_) | Self::List(_) | Self::Object | Self::Null => None,
        }
    }

    /// Short kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Object => "object",
            Self::Null => "null",
        }
    }

    /// Text form used when the value fills a label placeholder.
    pub fn to_label(&self) -> String {
        match self {
            Self::Float(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(_) | Self::Object | Self::Null => String::new(),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Value::String(s) => Self::Text(s),
            Value::Array(a) => Self::List(a.len()),
            Value::Object(_) => Self::Object,
        }
    }
}

/// Split a serializable record into its top-level fields.
pub(super) fn flatten<T: Serialize>(
    record: &T,
) -> Result<Vec<(String, FieldValue)>, serde_json::Error> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
            "record must serialize to an object, got {other}"
        ))),
    }
}
