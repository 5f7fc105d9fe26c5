//! Device records — one string-keyed telemetry mapping per device.
//!
//! Records arrive from callers that parse device reports and health-check
//! files into flat field mappings (inventory facts plus `hc_*` metrics).
//! The core never mutates a record after construction.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::value::FieldValue;

/// One device's telemetry record: a host identifier plus a flat field map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Host identifier. Synthetic (`device-{index}`) when the source
    /// mapping carried no usable `host` field.
    pub host: String,
    /// All telemetry fields, including the original `host` entry if any.
    pub fields: FxHashMap<String, FieldValue>,
}

impl DeviceRecord {
    /// Create an empty record for the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            fields: FxHashMap::default(),
        }
    }

    /// Builder-style field insertion, for tests and fixtures.
    pub fn with_field(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Raw field lookup.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Numeric field lookup. Absent, null, boolean, and textual values
    /// all read as `None`.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(FieldValue::as_number)
    }

    /// Numeric field lookup with boolean coercion (true → 1.0).
    pub fn numeric(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(FieldValue::to_numeric)
    }

    /// Text field lookup.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(FieldValue::as_text)
    }

    /// Whether a field is present as a set flag (`true` or non-zero).
    pub fn flag(&self, key: &str) -> bool {
        self.fields.get(key).is_some_and(FieldValue::is_set_flag)
    }

    /// Build a record from a JSON object, resolving the host identifier.
    ///
    /// `index` is the record's position in its batch and names the record
    /// (`device-{index}`) when no `host` field is present. Nested values
    /// (objects, arrays) are not telemetry scalars and are skipped.
    pub fn from_json(index: usize, value: &serde_json::Value) -> Self {
        let mut fields = FxHashMap::default();
        if let Some(map) = value.as_object() {
            for (key, v) in map {
                if let Some(scalar) = scalar_from_json(v) {
                    fields.insert(key.clone(), scalar);
                }
            }
        }
        let host = match fields.get("host") {
            Some(FieldValue::Text(h)) if !h.is_empty() => h.clone(),
            _ => format!("device-{index}"),
        };
        Self { host, fields }
    }
}

/// Build a record batch from a JSON array of field mappings.
///
/// Non-object entries become empty records with synthetic hosts, so the
/// batch stays index-aligned with the caller's input.
pub fn records_from_json(value: &serde_json::Value) -> Vec<DeviceRecord> {
    match value.as_array() {
        Some(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| DeviceRecord::from_json(i, item))
            .collect(),
        None => Vec::new(),
    }
}

fn scalar_from_json(value: &serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map(FieldValue::Number),
        serde_json::Value::Bool(b) => Some(FieldValue::Bool(*b)),
        serde_json::Value::String(s) => Some(FieldValue::Text(s.clone())),
        serde_json::Value::Null => Some(FieldValue::Null),
        serde_json::Value::Object(_) | serde_json::Value::Array(_) => None,
    }
}
