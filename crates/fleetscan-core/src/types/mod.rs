//! Telemetry value and record types.

pub mod record;
pub mod value;

pub use record::{records_from_json, DeviceRecord};
pub use value::FieldValue;
