//! Core types for detection results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One flagged record in a detection outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flagged {
    /// Index into the input batch.
    pub index: usize,
    /// Host identifier of the flagged record.
    pub host: String,
    /// Anomaly score, when the detector produces one. Higher = more
    /// normal (the ensemble convention); the IQR detector emits none.
    pub score: Option<f64>,
}

/// Outcome of one detection pass over a record batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Flagged records. Input order for IQR and the rule pass; decision
    /// order (index order, or score-ranked when the fallback engaged)
    /// for the ensemble.
    pub flagged: Vec<Flagged>,
    /// Feature columns the detector actually consulted.
    pub feature_names: Vec<String>,
}

impl Detection {
    /// Empty outcome: nothing flagged, no features retained.
    pub fn empty() -> Self {
        Self {
            flagged: Vec::new(),
            feature_names: Vec::new(),
        }
    }

    /// Whether nothing was flagged.
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }

    /// Hosts of the flagged records, in outcome order.
    pub fn hosts(&self) -> Vec<&str> {
        self.flagged.iter().map(|f| f.host.as_str()).collect()
    }

    /// Score lookup by host, for downstream display.
    pub fn score_of(&self, host: &str) -> Option<f64> {
        self.flagged
            .iter()
            .find(|f| f.host == host)
            .and_then(|f| f.score)
    }

    /// Flagged batch indices, in outcome order.
    pub fn indices(&self) -> Vec<usize> {
        self.flagged.iter().map(|f| f.index).collect()
    }
}

/// Detection strategy tiers, in pipeline evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Multivariate ensemble over the feature matrix. Preferred: adapts
    /// to scale and considers features jointly.
    Ensemble,
    /// Fixed operational rules on raw records. Engages when the ensemble
    /// flags nothing, guaranteeing coverage on tiny batches.
    RulePass,
    /// Per-column interquartile fences. Explicit caller choice only;
    /// never part of the automatic fallback chain.
    Iqr,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ensemble => "ensemble",
            Self::RulePass => "rule_pass",
            Self::Iqr => "iqr",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
