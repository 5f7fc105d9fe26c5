//! Feature matrix construction with median imputation.
//!
//! Turns a heterogeneous record batch into an N×M numeric matrix:
//! missing values are median-imputed per column, zero-variance columns
//! are dropped. Medians are recomputed fresh on every call, so the same
//! batch always yields the same matrix.

use serde::{Deserialize, Serialize};
use tracing::debug;

use fleetscan_core::DeviceRecord;

use super::candidates::CANDIDATE_FEATURES;

/// A dense numeric matrix over the retained candidate features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMatrix {
    /// One numeric row per input record, in input order.
    pub rows: Vec<Vec<f64>>,
    /// Retained column names, in candidate-list order.
    pub feature_names: Vec<String>,
}

impl FeatureMatrix {
    /// Number of rows (records).
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of retained feature columns.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Whether the matrix has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.feature_names.is_empty()
    }
}

/// Build the feature matrix for a record batch.
///
/// Per candidate column: booleans coerce to 0/1, text and null read as
/// missing. Columns with no present value, or whose present values are
/// all equal (within float tolerance), are dropped. Missing cells take
/// the column median of the present values; 0.0 is the last-resort fill.
pub fn build_feature_matrix(records: &[DeviceRecord]) -> FeatureMatrix {
    if records.is_empty() {
        return FeatureMatrix {
            rows: Vec::new(),
            feature_names: Vec::new(),
        };
    }

    // Raw per-record values with gaps preserved.
    let raw: Vec<Vec<Option<f64>>> = records
        .iter()
        .map(|r| {
            CANDIDATE_FEATURES
                .iter()
                .map(|&name| r.numeric(name))
                .collect()
        })
        .collect();

    // Column-wise median and retention decision.
    let mut medians: Vec<Option<f64>> = Vec::with_capacity(CANDIDATE_FEATURES.len());
    let mut keep: Vec<bool> = Vec::with_capacity(CANDIDATE_FEATURES.len());
    for (j, &name) in CANDIDATE_FEATURES.iter().enumerate() {
        let mut present: Vec<f64> = raw.iter().filter_map(|row| row[j]).collect();
        if present.is_empty() {
            debug!(column = name, "dropping column: no present values");
            medians.push(None);
            keep.push(false);
            continue;
        }
        present.sort_by(f64::total_cmp);
        medians.push(Some(median_of_sorted(&present)));
        let constant = nearly_equal(present[0], present[present.len() - 1]);
        if constant {
            debug!(column = name, "dropping column: zero variance");
        }
        keep.push(!constant);
    }

    let feature_names: Vec<String> = CANDIDATE_FEATURES
        .iter()
        .zip(&keep)
        .filter(|(_, &k)| k)
        .map(|(&name, _)| name.to_string())
        .collect();

    let rows: Vec<Vec<f64>> = raw
        .iter()
        .map(|row| {
            row.iter()
                .copied()
                .enumerate()
                .filter(|(j, _)| keep[*j])
                .map(|(j, v)| v.or(medians[j]).unwrap_or(0.0))
                .collect()
        })
        .collect();

    FeatureMatrix {
        rows,
        feature_names,
    }
}

/// Median of a sorted slice: middle element for odd length, mean of the
/// two middle elements for even length.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        0.5 * (sorted[mid - 1] + sorted[mid])
    }
}

/// Relative float comparison with 1e-9 tolerance.
fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs())
}
