//! Detection pipeline: ordered strategy tiers plus action mapping.
//!
//! Policy, stated explicitly: statistical detection is preferred because
//! it is multivariate and adapts to scale, but it legitimately yields
//! nothing when the feature matrix degenerates (tiny or constant
//! batches). The tier list is evaluated in order until one produces a
//! non-empty result, and the rule pass guarantees operationally
//! meaningful coverage without statistical significance. The IQR path is
//! an explicit caller choice that bypasses the tier list entirely.

use serde::{Deserialize, Serialize};
use tracing::info;

use fleetscan_core::{DetectionConfig, DetectionError, DeviceRecord};

use crate::actions::{suggest_actions, ActionMap};
use crate::outliers::ensemble::EnsembleDetector;
use crate::outliers::forest::{IsolationForest, OutlierLearner};
use crate::outliers::types::{Detection, Strategy};
use crate::outliers::{iqr, rule_based};

/// Caller-facing algorithm choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Ensemble detector with the rule-pass fallback tier.
    #[default]
    Ensemble,
    /// IQR detector only.
    Iqr,
}

/// Result of one pipeline run over a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineOutcome {
    /// The detection outcome of the winning tier.
    pub detection: Detection,
    /// Which tier produced it.
    pub strategy: Strategy,
    /// Remediation suggestions for the flagged records.
    pub suggestions: ActionMap,
}

/// Composes the detectors and the action mapper.
pub struct DetectionPipeline {
    config: DetectionConfig,
    detector: EnsembleDetector,
}

/// Tier order for the default algorithm.
const TIERS: [Strategy; 2] = [Strategy::Ensemble, Strategy::RulePass];

impl DetectionPipeline {
    /// Pipeline with the given configuration and the default learner,
    /// sized by the configured tree count.
    pub fn new(config: DetectionConfig) -> Self {
        let learner = IsolationForest {
            tree_count: config.effective_tree_count(),
            ..IsolationForest::default()
        };
        Self {
            detector: EnsembleDetector::new(Box::new(learner)),
            config,
        }
    }

    /// Pipeline with default configuration and learner.
    pub fn with_defaults() -> Self {
        Self::new(DetectionConfig::default())
    }

    /// Pipeline with a caller-supplied learner capability.
    pub fn with_learner(config: DetectionConfig, learner: Box<dyn OutlierLearner>) -> Self {
        Self {
            config,
            detector: EnsembleDetector::new(learner),
        }
    }

    /// Run detection and map the flagged records to suggestions.
    pub fn run(
        &self,
        records: &[DeviceRecord],
        algorithm: Algorithm,
    ) -> Result<PipelineOutcome, DetectionError> {
        let (detection, strategy) = match algorithm {
            Algorithm::Iqr => (
                iqr::detect(records, self.config.effective_iqr_multiplier()),
                Strategy::Iqr,
            ),
            Algorithm::Ensemble => self.run_tiers(records)?,
        };

        info!(
            strategy = %strategy,
            flagged = detection.flagged.len(),
            batch = records.len(),
            "detection complete"
        );

        let suggestions = if detection.is_empty() {
            ActionMap::new()
        } else {
            suggest_actions(detection.flagged.iter().map(|f| &records[f.index]))
        };

        Ok(PipelineOutcome {
            detection,
            strategy,
            suggestions,
        })
    }

    /// Evaluate the tier list until one yields a non-empty result. The
    /// last tier's (possibly empty) result stands otherwise.
    fn run_tiers(&self, records: &[DeviceRecord]) -> Result<(Detection, Strategy), DetectionError> {
        let mut outcome = (Detection::empty(), Strategy::Ensemble);
        for tier in TIERS {
            let detection = match tier {
                Strategy::Ensemble => self.detector.detect(
                    records,
                    self.config.effective_contamination(),
                    self.config.effective_seed(),
                )?,
                Strategy::RulePass => rule_based::detect(records, &self.config),
                Strategy::Iqr => iqr::detect(records, self.config.effective_iqr_multiplier()),
            };
            let non_empty = !detection.is_empty();
            outcome = (detection, tier);
            if non_empty {
                break;
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varied_batch(n: usize) -> Vec<DeviceRecord> {
        (0..n)
            .map(|i| {
                DeviceRecord::new(format!("r{i}"))
                    .with_field("mem_used_pct", 40.0 + (i % 7) as f64)
                    .with_field("uptime_days", 50.0 + (i % 5) as f64)
            })
            .collect()
    }

    #[test]
    fn ensemble_tier_wins_when_it_flags() {
        let mut records = varied_batch(15);
        records.push(
            DeviceRecord::new("weird")
                .with_field("mem_used_pct", 300.0)
                .with_field("uptime_days", -40.0),
        );
        let outcome = DetectionPipeline::with_defaults()
            .run(&records, Algorithm::Ensemble)
            .unwrap();
        assert_eq!(outcome.strategy, Strategy::Ensemble);
        assert!(outcome.detection.hosts().contains(&"weird"));
        assert!(outcome.suggestions.contains_key("weird"));
    }

    #[test]
    fn configured_tree_count_reaches_the_default_learner() {
        let mut records = varied_batch(15);
        records.push(
            DeviceRecord::new("weird")
                .with_field("mem_used_pct", 300.0)
                .with_field("uptime_days", -40.0),
        );
        let config = DetectionConfig {
            tree_count: Some(1),
            ..DetectionConfig::default()
        };

        // A hand-built single-tree learner must be indistinguishable
        // from the configured pipeline under the same seed; a 300-tree
        // default would produce different scores.
        let configured = DetectionPipeline::new(config.clone())
            .run(&records, Algorithm::Ensemble)
            .unwrap();
        let explicit = DetectionPipeline::with_learner(
            config,
            Box::new(IsolationForest {
                tree_count: 1,
                ..IsolationForest::default()
            }),
        )
        .run(&records, Algorithm::Ensemble)
        .unwrap();

        assert!(!configured.detection.is_empty());
        assert_eq!(configured.detection.indices(), explicit.detection.indices());
        assert_eq!(
            configured
                .detection
                .flagged
                .iter()
                .map(|f| f.score)
                .collect::<Vec<_>>(),
            explicit
                .detection
                .flagged
                .iter()
                .map(|f| f.score)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn rule_pass_engages_on_a_degenerate_matrix() {
        // Constant candidate columns leave the ensemble nothing to fit,
        // but the expired license still surfaces through the rule tier.
        let records = vec![
            DeviceRecord::new("a")
                .with_field("mem_used_pct", 50.0)
                .with_field("license_expired", 1),
            DeviceRecord::new("b")
                .with_field("mem_used_pct", 50.0)
                .with_field("license_expired", 1),
        ];
        let outcome = DetectionPipeline::with_defaults()
            .run(&records, Algorithm::Ensemble)
            .unwrap();
        assert_eq!(outcome.strategy, Strategy::RulePass);
        assert_eq!(outcome.detection.hosts(), vec!["a", "b"]);
        assert_eq!(
            outcome.detection.feature_names,
            rule_based::RULE_PASS_FEATURES
        );
    }

    #[test]
    fn empty_everything_leaves_an_empty_outcome() {
        let records = vec![
            DeviceRecord::new("a").with_field("mem_used_pct", 50.0),
            DeviceRecord::new("b").with_field("mem_used_pct", 50.0),
        ];
        let outcome = DetectionPipeline::with_defaults()
            .run(&records, Algorithm::Ensemble)
            .unwrap();
        assert_eq!(outcome.strategy, Strategy::RulePass);
        assert!(outcome.detection.is_empty());
        assert!(outcome.suggestions.is_empty());
    }

    #[test]
    fn iqr_choice_bypasses_the_tier_list() {
        let mut records = varied_batch(8);
        records.push(DeviceRecord::new("spike").with_field("mem_used_pct", 500.0));
        let outcome = DetectionPipeline::with_defaults()
            .run(&records, Algorithm::Iqr)
            .unwrap();
        assert_eq!(outcome.strategy, Strategy::Iqr);
        assert_eq!(outcome.detection.hosts(), vec!["spike"]);
        // IQR produces no continuous scores.
        assert!(outcome.detection.flagged.iter().all(|f| f.score.is_none()));
    }
}
