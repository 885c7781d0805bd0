use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::PipelineError;

/// What actually goes to the classification collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationPayload {
    /// JPEG of the frozen frame
    pub image: Option<Bytes>,
    pub labels: Vec<String>,
    pub secondary_labels: Option<Vec<String>>,
}

/// Port for the remote "where does this go" classifier
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassificationPort: Send + Sync {
    async fn classify(&self, payload: &ClassificationPayload) -> Result<String, PipelineError>;
}
