use anyhow::Result;
use async_trait::async_trait;

/// Port for a generative model that answers a text prompt, optionally
/// looking at one JPEG image.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModelPort: Send + Sync {
    async fn generate(&self, prompt: &str, image: Option<Vec<u8>>) -> Result<String>;
}
