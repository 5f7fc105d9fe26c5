//! Numeric feature extraction from heterogeneous records.

pub mod candidates;
pub mod matrix;

pub use candidates::{CANDIDATE_FEATURES, IQR_EXCLUDED_FIELDS};
pub use matrix::{build_feature_matrix, FeatureMatrix};
