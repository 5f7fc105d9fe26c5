//! Ensemble detector: multivariate outlier detection with a guaranteed
//! non-empty fallback.
//!
//! Wraps a pluggable [`OutlierLearner`] behind the batch contract: build
//! the feature matrix, fit once under the caller's seed, and return the
//! binary-flagged rows. When the learner flags nothing, the K
//! lowest-scored rows are returned instead, K = max(1, round(N * c)).
//!
//! Fail-open by design: degenerate input and a missing learner both
//! produce the empty result shape. Only learner faults become errors.

use tracing::{debug, warn};

use fleetscan_core::{DetectionError, DeviceRecord};

use crate::features::matrix::build_feature_matrix;

use super::forest::{IsolationForest, LearnerVerdict, OutlierLearner};
use super::types::{Detection, Flagged};

/// Multivariate detector over the feature matrix.
pub struct EnsembleDetector {
    learner: Option<Box<dyn OutlierLearner>>,
}

impl EnsembleDetector {
    /// Detector backed by the default isolation forest.
    pub fn with_defaults() -> Self {
        Self {
            learner: Some(Box::new(IsolationForest::default())),
        }
    }

    /// Detector backed by a caller-supplied learner.
    pub fn new(learner: Box<dyn OutlierLearner>) -> Self {
        Self {
            learner: Some(learner),
        }
    }

    /// Detector with no learner capability. Always yields the empty
    /// result shape, never an error.
    pub fn disabled() -> Self {
        Self { learner: None }
    }

    /// Detect anomalous records in the batch.
    ///
    /// `contamination` is clamped to [0.01, 0.5] before use; `seed`
    /// makes repeated calls over the same batch reproducible.
    pub fn detect(
        &self,
        records: &[DeviceRecord],
        contamination: f64,
        seed: u64,
    ) -> Result<Detection, DetectionError> {
        let Some(learner) = self.learner.as_deref() else {
            return Ok(Detection::empty());
        };
        if records.is_empty() {
            return Ok(Detection::empty());
        }

        let matrix = build_feature_matrix(records);
        if matrix.is_empty() {
            // Zero retained features: nothing to learn from.
            return Ok(Detection {
                flagged: Vec::new(),
                feature_names: matrix.feature_names,
            });
        }

        let n = matrix.n_rows();
        let contamination = contamination.clamp(0.01, 0.5);
        let top_k = ((n as f64 * contamination).round() as usize).max(1);

        debug!(
            rows = n,
            features = matrix.n_features(),
            contamination,
            seed,
            "fitting ensemble learner"
        );
        let verdict = learner.fit_score(&matrix, contamination, seed)?;
        validate_verdict(&verdict, n)?;

        let mut indices: Vec<usize> = (0..n).filter(|&i| verdict.flagged[i]).collect();
        if indices.is_empty() {
            // Conservative decisions are common on small batches; fall
            // back to a full ascending rank of the scores.
            warn!(top_k, "learner flagged nothing; ranking by score");
            let mut ranked: Vec<usize> = (0..n).collect();
            ranked.sort_by(|&a, &b| verdict.scores[a].total_cmp(&verdict.scores[b]));
            ranked.truncate(top_k);
            indices = ranked;
        }

        let flagged = indices
            .into_iter()
            .map(|index| Flagged {
                index,
                host: records[index].host.clone(),
                score: Some(verdict.scores[index]),
            })
            .collect();

        Ok(Detection {
            flagged,
            feature_names: matrix.feature_names,
        })
    }
}

/// Reject learner output that does not line up with the batch. Silent
/// acceptance here would corrupt every downstream consumer.
fn validate_verdict(verdict: &LearnerVerdict, expected: usize) -> Result<(), DetectionError> {
    if verdict.scores.len() != expected || verdict.flagged.len() != expected {
        return Err(DetectionError::ScoreShapeMismatch {
            expected,
            scores: verdict.scores.len(),
            flags: verdict.flagged.len(),
        });
    }
    if let Some(index) = verdict.scores.iter().position(|s| !s.is_finite()) {
        return Err(DetectionError::NonFiniteScore { index });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::matrix::FeatureMatrix;

    /// Learner that never flags and scores rows by their first feature.
    struct NeverFlags;

    impl OutlierLearner for NeverFlags {
        fn fit_score(
            &self,
            matrix: &FeatureMatrix,
            _contamination: f64,
            _seed: u64,
        ) -> Result<LearnerVerdict, DetectionError> {
            Ok(LearnerVerdict {
                flagged: vec![false; matrix.n_rows()],
                scores: matrix.rows.iter().map(|r| -r[0]).collect(),
            })
        }
    }

    /// Learner that emits one score too few.
    struct ShortScores;

    impl OutlierLearner for ShortScores {
        fn fit_score(
            &self,
            matrix: &FeatureMatrix,
            _contamination: f64,
            _seed: u64,
        ) -> Result<LearnerVerdict, DetectionError> {
            Ok(LearnerVerdict {
                flagged: vec![false; matrix.n_rows()],
                scores: vec![-0.5; matrix.n_rows().saturating_sub(1)],
            })
        }
    }

    /// Learner that emits one binary flag too few.
    struct ShortFlags;

    impl OutlierLearner for ShortFlags {
        fn fit_score(
            &self,
            matrix: &FeatureMatrix,
            _contamination: f64,
            _seed: u64,
        ) -> Result<LearnerVerdict, DetectionError> {
            Ok(LearnerVerdict {
                flagged: vec![false; matrix.n_rows().saturating_sub(1)],
                scores: vec![-0.5; matrix.n_rows()],
            })
        }
    }

    fn varied_batch(n: usize) -> Vec<DeviceRecord> {
        (0..n)
            .map(|i| {
                DeviceRecord::new(format!("r{i}"))
                    .with_field("mem_used_pct", 40.0 + i as f64)
                    .with_field("uptime_days", 100.0 - i as f64)
            })
            .collect()
    }

    #[test]
    fn fallback_returns_exactly_top_k() {
        let records = varied_batch(10);
        let det = EnsembleDetector::new(Box::new(NeverFlags));
        let out = det.detect(&records, 0.20, 42).unwrap();
        // K = round(10 * 0.20) = 2, ranked by ascending score
        // (score = -mem_used_pct, so the highest-memory rows rank first).
        assert_eq!(out.hosts(), vec!["r9", "r8"]);
        assert_eq!(out.score_of("r9"), Some(-49.0));
    }

    #[test]
    fn fallback_flags_at_least_one_row() {
        let records = varied_batch(3);
        let det = EnsembleDetector::new(Box::new(NeverFlags));
        // round(3 * 0.01) = 0, but K is floored at 1.
        let out = det.detect(&records, 0.01, 42).unwrap();
        assert_eq!(out.flagged.len(), 1);
    }

    #[test]
    fn empty_batch_is_fail_open() {
        let det = EnsembleDetector::with_defaults();
        let out = det.detect(&[], 0.2, 42).unwrap();
        assert!(out.is_empty());
        assert!(out.feature_names.is_empty());
    }

    #[test]
    fn constant_batch_has_no_features_and_no_learner_call() {
        // Every candidate column is constant, so the matrix retains
        // nothing and ShortScores (which would error) never runs.
        let records: Vec<DeviceRecord> = (0..4)
            .map(|i| DeviceRecord::new(format!("r{i}")).with_field("mem_used_pct", 50.0))
            .collect();
        let det = EnsembleDetector::new(Box::new(ShortScores));
        let out = det.detect(&records, 0.2, 42).unwrap();
        assert!(out.is_empty());
        assert!(out.feature_names.is_empty());
    }

    #[test]
    fn missing_capability_is_fail_open() {
        let records = varied_batch(5);
        let out = EnsembleDetector::disabled().detect(&records, 0.2, 42).unwrap();
        assert!(out.is_empty());
        assert!(out.feature_names.is_empty());
    }

    #[test]
    fn malformed_learner_output_is_an_error() {
        let records = varied_batch(5);
        let det = EnsembleDetector::new(Box::new(ShortScores));
        let err = det.detect(&records, 0.2, 42).unwrap_err();
        assert!(matches!(
            err,
            DetectionError::ScoreShapeMismatch {
                expected: 5,
                scores: 4,
                flags: 5,
            }
        ));
    }

    #[test]
    fn shape_error_names_the_short_vector() {
        // Correct scores but truncated flags must not be blamed on the
        // scores vector.
        let records = varied_batch(5);
        let det = EnsembleDetector::new(Box::new(ShortFlags));
        let err = det.detect(&records, 0.2, 42).unwrap_err();
        assert!(matches!(
            err,
            DetectionError::ScoreShapeMismatch {
                expected: 5,
                scores: 5,
                flags: 4,
            }
        ));
        assert_eq!(
            err.to_string(),
            "learner produced 5 scores and 4 flags for 5 rows"
        );
    }

    #[test]
    fn default_learner_finds_the_planted_outlier() {
        let mut records = varied_batch(12);
        records.push(
            DeviceRecord::new("bad")
                .with_field("mem_used_pct", 400.0)
                .with_field("uptime_days", -300.0),
        );
        let det = EnsembleDetector::with_defaults();
        let out = det.detect(&records, 0.20, 42).unwrap();
        assert!(out.hosts().contains(&"bad"));
        assert!(out.score_of("bad").is_some());
    }

    #[test]
    fn same_seed_same_outcome() {
        let records = varied_batch(9);
        let det = EnsembleDetector::with_defaults();
        let a = det.detect(&records, 0.25, 7).unwrap();
        let b = det.detect(&records, 0.25, 7).unwrap();
        assert_eq!(a.indices(), b.indices());
        assert_eq!(
            a.flagged.iter().map(|f| f.score).collect::<Vec<_>>(),
            b.flagged.iter().map(|f| f.score).collect::<Vec<_>>()
        );
    }
}
