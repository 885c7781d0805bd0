use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::application::ports::ScoreRepository;
use crate::domain::{ActorId, ScoreEntry};

pub struct PostgresScoreRepository {
    pool: PgPool,
}

impl PostgresScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the scores table if this is a fresh database.
    pub async fn ensure_schema(&self) -> Result<(), String> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS scores (
                actor_id UUID PRIMARY KEY,
                name TEXT NOT NULL,
                score BIGINT NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Database error: {}", e))?;
        Ok(())
    }
}

#[async_trait]
impl ScoreRepository for PostgresScoreRepository {
    async fn increment(&self, actor: &ActorId, name: &str) -> Result<i64, String> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO scores (actor_id, name, score)
             VALUES ($1, $2, 1)
             ON CONFLICT (actor_id)
             DO UPDATE SET score = scores.score + 1, name = EXCLUDED.name
             RETURNING score",
        )
        .bind(actor.as_uuid())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| format!("Database error: {}", e))
    }

    async fn top(&self, limit: usize) -> Result<Vec<ScoreEntry>, String> {
        let rows: Vec<(Uuid, String, i64)> = sqlx::query_as(
            "SELECT actor_id, name, score
             FROM scores
             ORDER BY score DESC, name ASC
             LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, name, score)| ScoreEntry {
                actor_id: ActorId::from_uuid(id),
                name,
                score,
            })
            .collect())
    }
}
