use std::sync::Arc;

use crate::application::ports::ScoreRepository;
use crate::application::ServiceError;
use crate::domain::ScoreEntry;

pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Read-only top-N query
pub struct LeaderboardQuery {
    scores: Arc<dyn ScoreRepository>,
    default_limit: usize,
}

impl LeaderboardQuery {
    pub fn new(scores: Arc<dyn ScoreRepository>, default_limit: usize) -> Self {
        Self {
            scores,
            default_limit: default_limit.clamp(1, MAX_LEADERBOARD_LIMIT),
        }
    }

    pub async fn handle(&self, limit: Option<usize>) -> Result<Vec<ScoreEntry>, ServiceError> {
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, MAX_LEADERBOARD_LIMIT);
        self.scores.top(limit).await.map_err(ServiceError::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockScoreRepository;

    #[tokio::test]
    async fn test_limit_defaults_and_is_clamped() {
        let mut repo = MockScoreRepository::new();
        repo.expect_top()
            .withf(|limit| *limit == 10)
            .times(1)
            .returning(|_| Ok(vec![]));
        repo.expect_top()
            .withf(|limit| *limit == MAX_LEADERBOARD_LIMIT)
            .times(1)
            .returning(|_| Ok(vec![]));
        let query = LeaderboardQuery::new(Arc::new(repo), 10);

        query.handle(None).await.unwrap();
        query.handle(Some(10_000)).await.unwrap();
    }
}
