use async_trait::async_trait;

use crate::domain::{ActorId, PipelineError, ScoreEntry};

/// Client-side port: credit one completed session to an actor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn increment(&self, actor: &ActorId) -> Result<(), PipelineError>;
}

/// Server-side score persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Add one point, creating the row on first use. Returns the new score.
    async fn increment(&self, actor: &ActorId, name: &str) -> Result<i64, String>;
    /// Highest scores first.
    async fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>, String>;
}
