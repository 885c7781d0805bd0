// HTTP clients for the trashcam server endpoints, used by the kiosk side

pub mod classification_client;
pub mod recognition_client;
pub mod score_client;

pub use classification_client::HttpClassificationClient;
pub use recognition_client::HttpRecognitionDetector;
pub use score_client::HttpScoreStore;

use std::time::Duration;

use anyhow::{Context, Result};
use shared::ErrorResponse;

/// Base address plus a shared connection pool.
#[derive(Clone)]
pub struct ServerEndpoint {
    http: reqwest::Client,
    base_url: String,
}

impl ServerEndpoint {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Best-effort readable message from a failed response.
pub(crate) async fn failure_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorResponse>().await {
        Ok(body) => format!("{} ({})", body.error, status),
        Err(_) => format!("server returned {}", status),
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use axum::Router;

    /// Serve `router` on an ephemeral local port and return its base URL.
    pub async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }
}
