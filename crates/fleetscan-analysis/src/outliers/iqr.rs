//! IQR detector with Tukey fences (single-variable, per column).
//!
//! Operates directly on raw records, independent of the feature matrix.
//! Resistant to extreme outliers that inflate stddev. A record is flagged
//! when any eligible column places it outside
//! `[Q1 - k*IQR, Q3 + k*IQR]`.

use rustc_hash::FxHashSet;

use fleetscan_core::DeviceRecord;

use crate::features::candidates::iqr_eligible;

use super::types::{Detection, Flagged};

/// Minimum present numeric values for a column to be measurable.
const MIN_PRESENT: usize = 4;
/// Minimum distinct numeric values (drops booleans and near-constants).
const MIN_DISTINCT: usize = 3;
/// Floor for the IQR width, so fences never collapse to a point.
const IQR_EPSILON: f64 = 1e-9;

/// Detect outliers across all eligible numeric columns.
///
/// `multiplier`: fence multiplier `k` (1.5 by convention). Returns the
/// union of per-column flags in original record order; the IQR method
/// produces no continuous scores.
pub fn detect(records: &[DeviceRecord], multiplier: f64) -> Detection {
    let columns = candidate_columns(records);
    if records.is_empty() || columns.is_empty() {
        return Detection {
            flagged: Vec::new(),
            feature_names: columns,
        };
    }

    let mut any_flag = vec![false; records.len()];
    for column in &columns {
        flag_column(records, column, multiplier, &mut any_flag);
    }

    let flagged = records
        .iter()
        .enumerate()
        .filter(|(i, _)| any_flag[*i])
        .map(|(index, r)| Flagged {
            index,
            host: r.host.clone(),
            score: None,
        })
        .collect();

    Detection {
        flagged,
        feature_names: columns,
    }
}

/// Columns eligible for IQR analysis, in sorted name order.
///
/// A field qualifies when it is numeric in at least [`MIN_PRESENT`]
/// records and carries at least [`MIN_DISTINCT`] distinct values.
/// Identifier and descriptive fields are excluded by name.
pub fn candidate_columns(records: &[DeviceRecord]) -> Vec<String> {
    let mut keys: Vec<&str> = records
        .iter()
        .flat_map(|r| r.fields.keys().map(String::as_str))
        .filter(|k| iqr_eligible(k))
        .collect::<FxHashSet<_>>()
        .into_iter()
        .collect();
    keys.sort_unstable();

    keys.into_iter()
        .filter(|key| {
            let mut nums: Vec<f64> = records.iter().filter_map(|r| r.number(key)).collect();
            if nums.len() < MIN_PRESENT {
                return false;
            }
            nums.sort_by(f64::total_cmp);
            nums.dedup();
            nums.len() >= MIN_DISTINCT
        })
        .map(str::to_string)
        .collect()
}

/// Mark records whose value in `column` falls outside the fences.
fn flag_column(records: &[DeviceRecord], column: &str, multiplier: f64, any_flag: &mut [bool]) {
    let mut sorted: Vec<f64> = records.iter().filter_map(|r| r.number(column)).collect();
    if sorted.len() < MIN_PRESENT {
        return;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);
    let iqr = (q3 - q1).max(IQR_EPSILON);
    let lo = q1 - multiplier * iqr;
    let hi = q3 + multiplier * iqr;

    for (i, record) in records.iter().enumerate() {
        // Missing or non-numeric values never flag.
        if let Some(v) = record.number(column) {
            if v < lo || v > hi {
                any_flag[i] = true;
            }
        }
    }
}

/// Percentile `p` ∈ [0, 1] of a sorted slice via linear interpolation on
/// the rank `(n - 1) * p`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = (sorted.len() - 1) as f64 * p;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    if upper >= sorted.len() {
        sorted[sorted.len() - 1]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}
