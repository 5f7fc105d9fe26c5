//! Detection configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the detection pipeline.
///
/// All fields are optional; `effective_*()` accessors supply the defaults
/// so a deserialized `{}` behaves identically to `Default::default()`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DetectionConfig {
    /// Expected anomalous fraction of a batch. Default: 0.20.
    pub contamination: Option<f64>,
    /// Seed for the ensemble learner. Default: 42.
    pub seed: Option<u64>,
    /// Tukey fence multiplier for the IQR detector. Default: 1.5.
    pub iqr_multiplier: Option<f64>,
    /// Trees in the default ensemble learner. Default: 300.
    pub tree_count: Option<usize>,
    /// Memory usage percentage treated as pressure. Default: 85.0.
    pub memory_pressure_pct: Option<f64>,
    /// Interface enablement ratio below which the rule pass flags a
    /// device. Default: 0.6.
    pub iface_enabled_floor: Option<f64>,
}

impl DetectionConfig {
    /// Effective contamination, clamped to [0.01, 0.5].
    pub fn effective_contamination(&self) -> f64 {
        self.contamination.unwrap_or(0.20).clamp(0.01, 0.5)
    }

    /// Effective learner seed, defaulting to 42.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or(42)
    }

    /// Effective IQR multiplier, defaulting to 1.5.
    pub fn effective_iqr_multiplier(&self) -> f64 {
        self.iqr_multiplier.unwrap_or(1.5)
    }

    /// Effective ensemble tree count, defaulting to 300.
    pub fn effective_tree_count(&self) -> usize {
        self.tree_count.unwrap_or(300)
    }

    /// Effective memory-pressure threshold, defaulting to 85.0.
    pub fn effective_memory_pressure_pct(&self) -> f64 {
        self.memory_pressure_pct.unwrap_or(85.0)
    }

    /// Effective interface enablement floor, defaulting to 0.6.
    pub fn effective_iface_enabled_floor(&self) -> f64 {
        self.iface_enabled_floor.unwrap_or(0.6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_matches_defaults() {
        let from_json: DetectionConfig = serde_json::from_str("{}").unwrap();
        let built = DetectionConfig::default();
        assert_eq!(
            from_json.effective_contamination(),
            built.effective_contamination()
        );
        assert_eq!(from_json.effective_seed(), 42);
        assert_eq!(from_json.effective_iqr_multiplier(), 1.5);
        assert_eq!(from_json.effective_tree_count(), 300);
    }

    #[test]
    fn contamination_is_clamped() {
        let cfg = DetectionConfig {
            contamination: Some(0.0),
            ..Default::default()
        };
        assert_eq!(cfg.effective_contamination(), 0.01);

        let cfg = DetectionConfig {
            contamination: Some(0.9),
            ..Default::default()
        };
        assert_eq!(cfg.effective_contamination(), 0.5);
    }
}
