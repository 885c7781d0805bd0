use thiserror::Error;

use super::aggregates::SessionPhase;

/// Failures the detection pipeline can run into.
///
/// None of these leave a session stuck: acquisition and inference failures
/// are absorbed by the sampling loop, classification failures settle the
/// session with an error outcome.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error("camera unavailable: {0}")]
    Acquisition(String),

    #[error("detector failed: {0}")]
    Inference(String),

    #[error("classification failed: {0}")]
    Classification(String),

    #[error("classification timed out after {0} ms")]
    Timeout(u64),

    #[error("nothing to classify: no frame and no detected objects")]
    NothingToClassify,

    #[error("score update failed: {0}")]
    Score(String),
}

/// A lifecycle call that does not apply in the session's current phase.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("cannot {action} a session that is {from:?}")]
pub struct TransitionError {
    pub from: SessionPhase,
    pub action: &'static str,
}
