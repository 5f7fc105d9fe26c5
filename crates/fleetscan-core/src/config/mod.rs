//! Configuration types.

pub mod detection_config;

pub use detection_config::DetectionConfig;
