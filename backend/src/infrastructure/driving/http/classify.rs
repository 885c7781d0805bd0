use axum::{extract::State, response::Json};
use shared::{ClassifyRequest, ClassifyResponse, RecognizeRequest, RecognizeResponse};

use crate::application::classify::ClassifyObjectsCommand;
use crate::application::ServiceError;
use crate::infrastructure::AppState;

pub async fn classify(
    State(state): State<AppState>,
    Json(payload): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ServiceError> {
    tracing::info!(
        "[API] classify: {} labels, image: {}",
        payload.labels.len(),
        payload.image.is_some()
    );
    let command = ClassifyObjectsCommand {
        image: payload.image,
        labels: payload.labels,
        secondary_labels: payload.secondary_labels,
    };
    let classification = state.classify.handle(command).await?;
    Ok(Json(ClassifyResponse { classification }))
}

pub async fn recognize(
    State(state): State<AppState>,
    Json(payload): Json<RecognizeRequest>,
) -> Result<Json<RecognizeResponse>, ServiceError> {
    let objects = state.recognize.handle(payload.image).await?;
    tracing::debug!("[API] recognize found {} objects", objects.len());
    Ok(Json(RecognizeResponse { objects }))
}
