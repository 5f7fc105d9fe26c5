//! Pluggable outlier learner contract and the default isolation forest.
//!
//! The ensemble detector treats the learner as a replaceable capability:
//! fit deterministically under a seed, score every row (higher = more
//! normal), and expose a binary decision per row. The default learner is
//! an isolation forest: randomized axis-aligned partitioning, with the
//! anomaly score derived from average path length.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use fleetscan_core::DetectionError;

use crate::features::matrix::FeatureMatrix;

/// Per-row verdicts from a fitted learner.
#[derive(Debug, Clone)]
pub struct LearnerVerdict {
    /// Binary decision per row: true = anomalous.
    pub flagged: Vec<bool>,
    /// Continuous score per row; higher = more normal.
    pub scores: Vec<f64>,
}

/// An unsupervised outlier learner over a feature matrix.
///
/// Implementations must be deterministic for a given matrix and seed.
/// The caller guarantees a non-empty matrix.
pub trait OutlierLearner: Send + Sync {
    fn fit_score(
        &self,
        matrix: &FeatureMatrix,
        contamination: f64,
        seed: u64,
    ) -> Result<LearnerVerdict, DetectionError>;
}

/// Isolation forest with subsampled trees.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    /// Number of trees in the ensemble.
    pub tree_count: usize,
    /// Per-tree subsample cap.
    pub subsample: usize,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self {
            tree_count: 300,
            subsample: 256,
        }
    }
}

enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

impl OutlierLearner for IsolationForest {
    fn fit_score(
        &self,
        matrix: &FeatureMatrix,
        contamination: f64,
        seed: u64,
    ) -> Result<LearnerVerdict, DetectionError> {
        let n = matrix.n_rows();
        let psi = self.subsample.min(n).max(1);
        let height_limit = (psi as f64).log2().ceil().max(1.0) as usize;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut trees = Vec::with_capacity(self.tree_count);
        for _ in 0..self.tree_count {
            let sample = sample_indices(&mut rng, n, psi);
            trees.push(build_tree(&matrix.rows, &sample, 0, height_limit, &mut rng));
        }

        let norm = average_path_length(psi);
        let scores: Vec<f64> = matrix
            .rows
            .iter()
            .map(|row| {
                let mean_path = trees
                    .iter()
                    .map(|t| path_length(t, row, 0))
                    .sum::<f64>()
                    / trees.len() as f64;
                // Anomaly score in (0, 1]; negate so higher = more normal.
                -(2f64.powf(-mean_path / norm))
            })
            .collect();

        // Decision threshold: the contamination-th percentile of the
        // training scores. Rows strictly below it are anomalous, so a
        // batch of tied scores legitimately flags nothing.
        let mut sorted = scores.clone();
        sorted.sort_by(f64::total_cmp);
        let offset = percentile(&sorted, contamination);
        let flagged = scores.iter().map(|&s| s < offset).collect();

        Ok(LearnerVerdict { flagged, scores })
    }
}

/// Sample `count` distinct row indices, or all of them when the batch is
/// no larger than the subsample cap.
fn sample_indices(rng: &mut StdRng, n: usize, count: usize) -> Vec<usize> {
    if count >= n {
        return (0..n).collect();
    }
    rand::seq::index::sample(rng, n, count).into_vec()
}

fn build_tree(
    rows: &[Vec<f64>],
    indices: &[usize],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if indices.len() <= 1 || depth >= height_limit {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    // Features that still vary within this partition.
    let n_features = rows[indices[0]].len();
    let mut splittable = Vec::new();
    for j in 0..n_features {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &i in indices {
            lo = lo.min(rows[i][j]);
            hi = hi.max(rows[i][j]);
        }
        if hi > lo {
            splittable.push((j, lo, hi));
        }
    }
    if splittable.is_empty() {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let (feature, lo, hi) = splittable[rng.gen_range(0..splittable.len())];
    let threshold = rng.gen_range(lo..hi);

    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| rows[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(rows, &left, depth + 1, height_limit, rng)),
        right: Box::new(build_tree(rows, &right, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &Node, row: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if row[*feature] < *threshold {
                path_length(left, row, depth + 1)
            } else {
                path_length(right, row, depth + 1)
            }
        }
    }
}

/// Expected path length of an unsuccessful BST search over `n` points,
/// the standard isolation-forest normalizer c(n).
fn average_path_length(n: usize) -> f64 {
    const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Percentile `p` ∈ [0, 1] of a sorted slice via linear interpolation.
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
