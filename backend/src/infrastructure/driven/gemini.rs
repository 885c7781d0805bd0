use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::LanguageModelPort;
use crate::config::LlmConfig;

/// LanguageModelPort backed by the Gemini `generateContent` REST call.
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("failed to build HTTP client")?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        Ok(Self {
            http,
            url,
            api_key: config.api_key.clone(),
        })
    }
}

fn build_request(prompt: &str, image: Option<&[u8]>) -> GenerateContentRequest {
    let mut parts = vec![Part {
        text: Some(prompt.to_string()),
        ..Part::default()
    }];
    if let Some(image) = image {
        parts.push(Part {
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".into(),
                data: shared::encode_image(image),
            }),
            ..Part::default()
        });
    }
    GenerateContentRequest {
        contents: vec![Content { parts }],
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(anyhow!("model returned no text"));
    }
    Ok(text)
}

#[async_trait]
impl LanguageModelPort for GeminiClient {
    async fn generate(&self, prompt: &str, image: Option<Vec<u8>>) -> Result<String> {
        let body = build_request(prompt, image.as_deref());
        debug!("calling {} (image: {})", self.url, image.is_some());

        let response = self
            .http
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .context("model request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("model returned {}: {}", status, detail));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .context("unreadable model response")?;
        extract_text(parsed)
    }
}
