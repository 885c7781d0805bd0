use async_trait::async_trait;
use shared::{RecognizeRequest, RecognizeResponse};

use super::{failure_message, ServerEndpoint};
use crate::application::ports::Detector;
use crate::domain::{Detection, Frame, PipelineError};

/// Detector over `POST /api/recognize`. The endpoint reports names only,
/// so every detection carries full confidence and an empty box.
pub struct HttpRecognitionDetector {
    endpoint: ServerEndpoint,
}

impl HttpRecognitionDetector {
    pub fn new(endpoint: ServerEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl Detector for HttpRecognitionDetector {
    async fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, PipelineError> {
        let response = self
            .endpoint
            .client()
            .post(self.endpoint.url("/api/recognize"))
            .json(&RecognizeRequest {
                image: frame.data().to_vec(),
            })
            .send()
            .await
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Inference(failure_message(response).await));
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Inference(e.to_string()))?;
        Ok(parsed.objects.into_iter().map(Detection::unscored).collect())
    }
}
