use std::sync::Arc;

use tracing::{error, info};

use crate::application::ports::ScoreRepository;
use crate::application::ServiceError;
use crate::domain::ActorId;

/// Command to credit one sorted item to an actor
#[derive(Debug, Clone)]
pub struct IncrementScoreCommand {
    pub actor_id: ActorId,
    pub display_name: String,
}

pub struct IncrementScoreHandler {
    scores: Arc<dyn ScoreRepository>,
}

impl IncrementScoreHandler {
    pub fn new(scores: Arc<dyn ScoreRepository>) -> Self {
        Self { scores }
    }

    pub async fn handle(&self, command: IncrementScoreCommand) -> Result<i64, ServiceError> {
        let name = match command.display_name.trim() {
            "" => "anonymous",
            name => name,
        };
        let score = self
            .scores
            .increment(&command.actor_id, name)
            .await
            .map_err(|e| {
                error!("Error incrementing score for {}: {}", command.actor_id, e);
                ServiceError::Storage(e)
            })?;
        info!("score for {} is now {}", command.actor_id, score);
        Ok(score)
    }
}
