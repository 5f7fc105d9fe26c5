//! fleetscan-core — shared types for the fleetscan telemetry pipeline.
//!
//! Holds the discriminated telemetry value type, the device record model,
//! detection configuration, and the error taxonomy. No analysis logic
//! lives here; see `fleetscan-analysis`.

pub mod config;
pub mod errors;
pub mod types;

pub use config::DetectionConfig;
pub use errors::DetectionError;
pub use types::{records_from_json, DeviceRecord, FieldValue};
