use std::sync::Arc;

use tracing::{info, warn};

use super::prompts::classification_prompt;
use crate::application::ports::LanguageModelPort;
use crate::application::ServiceError;

/// Command to sort detected objects into bins
#[derive(Debug, Clone, Default)]
pub struct ClassifyObjectsCommand {
    pub image: Option<Vec<u8>>,
    pub labels: Vec<String>,
    pub secondary_labels: Option<Vec<String>>,
}

pub struct ClassifyObjectsHandler {
    model: Arc<dyn LanguageModelPort>,
}

impl ClassifyObjectsHandler {
    pub fn new(model: Arc<dyn LanguageModelPort>) -> Self {
        Self { model }
    }

    pub async fn handle(&self, command: ClassifyObjectsCommand) -> Result<String, ServiceError> {
        let labels: Vec<String> = command
            .labels
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        let image = command.image.filter(|i| !i.is_empty());

        if image.is_none() && labels.is_empty() {
            return Err(ServiceError::BadRequest(
                "No image or detected objects provided".to_string(),
            ));
        }

        let prompt = classification_prompt(
            &labels,
            command.secondary_labels.as_deref(),
            image.is_some(),
        );
        info!(
            "classifying labels={:?} image={}",
            labels,
            image.is_some()
        );

        let answer = self.model.generate(&prompt, image).await.map_err(|e| {
            warn!("classification model call failed: {:#}", e);
            ServiceError::Upstream(e.to_string())
        })?;
        Ok(answer.trim().to_string())
    }
}
