//! Error taxonomy.
//!
//! The pipeline fails open on missing or malformed data: absent fields,
//! wrong types, and degenerate batches all produce empty results, never
//! errors. Only faults inside the outlier learner surface here.

pub mod detection_error;

pub use detection_error::DetectionError;
