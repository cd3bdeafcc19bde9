/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No agent may call a provider directly.
/// Every generative stage goes through `LlmClient::complete`, which is where
/// reasoning blocks, markdown fences and truncated JSON are cleaned up.
///
/// Transport lives behind the `GenerationProvider` trait so the pipeline can
/// run against any OpenAI-compatible endpoint (or a scripted double in tests).
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub mod json_repair;
#[cfg(test)]
pub mod mock;
pub mod prompts;
pub mod provider;
pub mod sanitize;

pub use json_repair::repair_json;
use sanitize::{strip_markdown_fence, strip_reasoning};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    ResponseShape(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A synchronous (non-streaming) chat-completion backend.
///
/// Implementations return the raw assistant text of the first choice; all
/// cleanup happens in [`LlmClient`].
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, GenerationError>;

    fn name(&self) -> &str {
        "generation"
    }
}

/// The resilient generation gateway shared by every generative agent.
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn GenerationProvider>,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn GenerationProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Makes one provider call and returns the cleaned response text.
    ///
    /// Cleaning order: reasoning blocks, then an outer markdown fence, then
    /// best-effort JSON repair. Fails if nothing usable is left.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        let raw = self.provider.complete(system, user).await?;
        let text = clean_completion(&raw);

        if text.trim().is_empty() {
            return Err(GenerationError::EmptyContent);
        }

        debug!(
            chars = text.len(),
            preview = %text.chars().take(120).collect::<String>(),
            "LLM response cleaned"
        );

        Ok(text)
    }
}

/// Applies the full cleanup chain to raw model output.
pub fn clean_completion(raw: &str) -> String {
    let text = strip_reasoning(raw);
    let text = strip_markdown_fence(&text);
    repair_json(text).into_owned()
}
