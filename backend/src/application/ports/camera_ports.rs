use async_trait::async_trait;

use crate::domain::{CameraFacing, Detection, Frame, PipelineError};

/// Port for the live camera (implemented by infrastructure)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Grab the current image.
    async fn capture(&self) -> Result<Frame, PipelineError>;

    /// Reconfigure which camera subsequent captures read from.
    async fn switch_facing(&self, facing: CameraFacing) -> Result<(), PipelineError>;
}

/// Port for an object detector. Latency is unbounded; callers must not
/// assume a call finishes before the next sampling tick.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, PipelineError>;
}
