use async_trait::async_trait;
use shared::{ClassifyRequest, ClassifyResponse};
use tracing::debug;

use super::{failure_message, ServerEndpoint};
use crate::application::ports::{ClassificationPayload, ClassificationPort};
use crate::domain::PipelineError;

/// ClassificationPort over `POST /api/classify`
pub struct HttpClassificationClient {
    endpoint: ServerEndpoint,
}

impl HttpClassificationClient {
    pub fn new(endpoint: ServerEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl ClassificationPort for HttpClassificationClient {
    async fn classify(&self, payload: &ClassificationPayload) -> Result<String, PipelineError> {
        let body = ClassifyRequest {
            image: payload.image.as_ref().map(|bytes| bytes.to_vec()),
            labels: payload.labels.clone(),
            secondary_labels: payload.secondary_labels.clone(),
        };
        debug!(
            "classify: {} labels, image: {}",
            body.labels.len(),
            body.image.is_some()
        );

        let response = self
            .endpoint
            .client()
            .post(self.endpoint.url("/api/classify"))
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::Classification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::Classification(failure_message(response).await));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Classification(e.to_string()))?;
        Ok(parsed.classification)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{http::StatusCode, routing::post, Json, Router};
    use bytes::Bytes;
    use shared::ErrorResponse;

    use super::*;
    use crate::infrastructure::driven::remote::test_server;

    async fn echo(Json(request): Json<ClassifyRequest>) -> Json<ClassifyResponse> {
        Json(ClassifyResponse {
            classification: format!(
                "{} labels, image {}",
                request.labels.join("+"),
                request.image.map(|i| i.len()).unwrap_or(0)
            ),
        })
    }

    async fn broken() -> (StatusCode, Json<ErrorResponse>) {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "model offline".into(),
            }),
        )
    }

    #[tokio::test]
    async fn test_payload_round_trips_through_endpoint() {
        let base = test_server::spawn(Router::new().route("/api/classify", post(echo))).await;
        let client =
            HttpClassificationClient::new(ServerEndpoint::new(&base, Duration::from_secs(5)).unwrap());

        let answer = client
            .classify(&ClassificationPayload {
                image: Some(Bytes::from_static(&[1, 2, 3, 4])),
                labels: vec!["bottle".into(), "cup".into()],
                secondary_labels: None,
            })
            .await
            .unwrap();
        assert_eq!(answer, "bottle+cup labels, image 4");
    }

    #[tokio::test]
    async fn test_error_status_becomes_classification_error() {
        let base = test_server::spawn(Router::new().route("/api/classify", post(broken))).await;
        let client =
            HttpClassificationClient::new(ServerEndpoint::new(&base, Duration::from_secs(5)).unwrap());

        let err = client
            .classify(&ClassificationPayload {
                labels: vec!["bottle".into()],
                ..ClassificationPayload::default()
            })
            .await
            .unwrap_err();
        match err {
            PipelineError::Classification(message) => assert!(message.contains("model offline")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
