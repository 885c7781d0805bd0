use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use shared::{LeaderboardEntry, LeaderboardResponse, ScoreResponse};

use super::middleware::AuthenticatedActor;
use crate::application::scoreboard::IncrementScoreCommand;
use crate::application::ServiceError;
use crate::infrastructure::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<usize>,
}

pub async fn increment_score(
    State(state): State<AppState>,
    actor: AuthenticatedActor,
) -> Result<Json<ScoreResponse>, ServiceError> {
    state
        .increment_score
        .handle(IncrementScoreCommand {
            actor_id: actor.id,
            display_name: actor.name,
        })
        .await?;
    Ok(Json(ScoreResponse { success: true }))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardParams>,
) -> Result<Json<LeaderboardResponse>, ServiceError> {
    let entries = state.leaderboard.handle(params.limit).await?;
    let leaderboard = entries
        .into_iter()
        .map(|entry| LeaderboardEntry {
            id: entry.actor_id.to_string(),
            name: entry.name,
            score: entry.score,
        })
        .collect();
    Ok(Json(LeaderboardResponse { leaderboard }))
}
