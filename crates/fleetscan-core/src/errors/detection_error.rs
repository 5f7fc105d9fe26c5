//! Detection errors.

/// Errors that can occur during ensemble detection.
///
/// These mean "detection unavailable", not "bad input": input-shape
/// problems are handled by returning empty results.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("outlier learner failed: {0}")]
    LearnerFailure(String),

    #[error("learner produced {scores} scores and {flags} flags for {expected} rows")]
    ScoreShapeMismatch {
        expected: usize,
        scores: usize,
        flags: usize,
    },

    #[error("learner produced a non-finite score at row {index}")]
    NonFiniteScore { index: usize },
}
