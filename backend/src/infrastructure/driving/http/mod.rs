use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use shared::ErrorResponse;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::application::ServiceError;
use crate::infrastructure::AppState;

pub mod classify;
pub mod middleware;
pub mod scores;

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("[API] {}", self);
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn create_router(state: AppState, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route("/api/classify", post(classify::classify))
        .route("/api/recognize", post(classify::recognize))
        .route("/api/score", post(scores::increment_score))
        .route("/api/leaderboard", get(scores::leaderboard))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
