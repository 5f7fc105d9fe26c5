//! fleetscan-analysis — anomaly detection over device telemetry batches.
//!
//! Data flow: records → feature matrix → ensemble detector →
//! action mapper. The IQR detector is an alternate path that consumes
//! records directly. The [`pipeline`] module composes the detectors
//! behind an ordered fallback policy.

pub mod actions;
pub mod features;
pub mod outliers;
pub mod pipeline;

pub use actions::{suggest_actions, ActionMap};
pub use features::matrix::{build_feature_matrix, FeatureMatrix};
pub use outliers::types::{Detection, Flagged, Strategy};
pub use pipeline::{Algorithm, DetectionPipeline, PipelineOutcome};

use fleetscan_core::{DetectionError, DeviceRecord};

/// Run the IQR detector with the given fence multiplier (1.5 is the
/// conventional Tukey value).
pub fn detect_iqr(records: &[DeviceRecord], multiplier: f64) -> Detection {
    outliers::iqr::detect(records, multiplier)
}

/// Run the ensemble detector with the default isolation-forest learner.
///
/// `contamination` is clamped to [0.01, 0.5]; `seed` fixes the learner's
/// randomness so repeated calls over the same batch agree.
pub fn detect_ensemble(
    records: &[DeviceRecord],
    contamination: f64,
    seed: u64,
) -> Result<Detection, DetectionError> {
    outliers::ensemble::EnsembleDetector::with_defaults().detect(records, contamination, seed)
}
