//! Outlier detection over record batches.
//!
//! Three independent mechanisms:
//! - ensemble: multivariate isolation forest over the feature matrix,
//!   with a guaranteed non-empty top-K fallback;
//! - iqr: per-column Tukey fences directly on raw records;
//! - rule_based: fixed operational rules, the last-resort tier of the
//!   detection pipeline.

pub mod ensemble;
pub mod forest;
pub mod iqr;
pub mod rule_based;
pub mod types;

pub use ensemble::EnsembleDetector;
pub use forest::{IsolationForest, LearnerVerdict, OutlierLearner};
pub use types::{Detection, Flagged, Strategy};
