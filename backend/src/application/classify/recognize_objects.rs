use std::sync::Arc;

use tracing::warn;

use super::prompts::{parse_object_list, RECOGNITION_PROMPT};
use crate::application::ports::LanguageModelPort;
use crate::application::ServiceError;

/// Lists the objects visible in a still image. Serves as the independent
/// second opinion for client-side detections.
pub struct RecognizeObjectsHandler {
    model: Arc<dyn LanguageModelPort>,
}

impl RecognizeObjectsHandler {
    pub fn new(model: Arc<dyn LanguageModelPort>) -> Self {
        Self { model }
    }

    pub async fn handle(&self, image: Vec<u8>) -> Result<Vec<String>, ServiceError> {
        if image.is_empty() {
            return Err(ServiceError::BadRequest("No image provided".to_string()));
        }

        let listing = self
            .model
            .generate(RECOGNITION_PROMPT, Some(image))
            .await
            .map_err(|e| {
                warn!("recognition model call failed: {:#}", e);
                ServiceError::Upstream(e.to_string())
            })?;
        Ok(parse_object_list(&listing))
    }
}
