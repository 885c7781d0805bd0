use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::ScoreRepository;
use crate::domain::{ActorId, ScoreEntry};

/// In-memory implementation of ScoreRepository, used when no database is configured
#[derive(Default, Clone)]
pub struct InMemoryScoreRepository {
    scores: Arc<RwLock<HashMap<ActorId, ScoreEntry>>>,
}

impl InMemoryScoreRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreRepository for InMemoryScoreRepository {
    async fn increment(&self, actor: &ActorId, name: &str) -> Result<i64, String> {
        let mut scores = self.scores.write().await;
        let entry = scores.entry(actor.clone()).or_insert_with(|| ScoreEntry {
            actor_id: actor.clone(),
            name: name.to_string(),
            score: 0,
        });
        entry.name = name.to_string();
        entry.score += 1;
        Ok(entry.score)
    }

    async fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>, String> {
        let scores = self.scores.read().await;
        let mut entries: Vec<ScoreEntry> = scores.values().cloned().collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        entries.truncate(limit);
        Ok(entries)
    }
}
