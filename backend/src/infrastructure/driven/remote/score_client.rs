use async_trait::async_trait;
use tracing::debug;

use super::{failure_message, ServerEndpoint};
use crate::application::ports::ScoreStore;
use crate::domain::{ActorId, PipelineError};

/// ScoreStore over `POST /api/score`. The server credits the actor named
/// in the bearer token.
pub struct HttpScoreStore {
    endpoint: ServerEndpoint,
    token: String,
}

impl HttpScoreStore {
    pub fn new(endpoint: ServerEndpoint, token: impl Into<String>) -> Self {
        Self {
            endpoint,
            token: token.into(),
        }
    }
}

#[async_trait]
impl ScoreStore for HttpScoreStore {
    async fn increment(&self, actor: &ActorId) -> Result<(), PipelineError> {
        debug!("crediting {}", actor);
        let response = self
            .endpoint
            .client()
            .post(self.endpoint.url("/api/score"))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| PipelineError::Score(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Score(failure_message(response).await));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use shared::ScoreResponse;

    use super::*;
    use crate::infrastructure::driven::remote::test_server;

    async fn score(headers: HeaderMap) -> Result<Json<ScoreResponse>, StatusCode> {
        match headers.get("authorization").and_then(|v| v.to_str().ok()) {
            Some("Bearer good-token") => Ok(Json(ScoreResponse { success: true })),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }

    #[tokio::test]
    async fn test_sends_bearer_token() {
        let base = test_server::spawn(Router::new().route("/api/score", post(score))).await;
        let endpoint = ServerEndpoint::new(&base, Duration::from_secs(5)).unwrap();

        HttpScoreStore::new(endpoint.clone(), "good-token")
            .increment(&ActorId::new())
            .await
            .unwrap();

        let err = HttpScoreStore::new(endpoint, "stale-token")
            .increment(&ActorId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Score(_)));
    }
}
