use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ensure_not_blank, l2_normalize, EmbeddingError, EmbeddingProvider};
use crate::config::EmbeddingSettings;

/// BGE models expect this prefix on query texts.
const BGE_PREFIX: &str = "Represent this sentence: ";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<String>,
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct HttpEmbeddingProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    use_prefix: bool,
    dims: OnceLock<usize>,
}

impl HttpEmbeddingProvider {
    pub fn new(settings: &EmbeddingSettings) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        let use_prefix = needs_prefix(&settings.model);

        info!(model = %settings.model, prefix = use_prefix, "HTTP embedding provider ready");

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", settings.base_url.trim_end_matches('/')),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            use_prefix,
            dims: OnceLock::new(),
        })
    }

    fn apply_prefix(&self, text: &str) -> String {
        if self.use_prefix {
            format!("{BGE_PREFIX}{text}")
        } else {
            text.to_string()
        }
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: texts.iter().map(|t| self.apply_prefix(t)).collect(),
            encoding_format: "float",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Embedding API returned {}: {}", status, message);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let vectors = order_and_normalize(parsed, texts.len())?;

        if let Some(first) = vectors.first() {
            let _ = self.dims.set(first.len());
        }
        debug!(count = vectors.len(), "Embeddings received");

        Ok(vectors)
    }
}

fn needs_prefix(model: &str) -> bool {
    model.to_lowercase().contains("bge")
}

fn order_and_normalize(
    response: EmbeddingResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if response.data.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {expected} vectors, got {}",
            response.data.len()
        )));
    }

    let mut data = response.data;
    data.sort_by_key(|d| d.index);

    let mut vectors = Vec::with_capacity(data.len());
    for datum in data {
        if datum.embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse("empty vector".into()));
        }
        let mut vector = datum.embedding;
        l2_normalize(&mut vector);
        vectors.push(vector);
    }
    Ok(vectors)
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        ensure_not_blank(text)?;
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("no vector returned".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        for text in texts {
            ensure_not_blank(text)?;
        }
        self.request(texts).await
    }

    fn dimensions(&self) -> usize {
        self.dims.get().copied().unwrap_or(0)
    }

    fn provider_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bge_models_get_prefix() {
        assert!(needs_prefix("baai/bge-m3"));
        assert!(needs_prefix("BAAI/BGE-small-en"));
        assert!(!needs_prefix("text-embedding-3-small"));
    }

    #[test]
    fn test_response_is_reordered_and_normalised() {
        let response: EmbeddingResponse = serde_json::from_str(
            r#"{"data":[
                {"embedding":[0.0, 2.0],"index":1},
                {"embedding":[3.0, 4.0],"index":0}
            ]}"#,
        )
        .unwrap();

        let vectors = order_and_normalize(response, 2).unwrap();
        assert!((vectors[0][0] - 0.6).abs() < 1e-6);
        assert!((vectors[1][1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_response_count_mismatch_is_rejected() {
        let response: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[1.0],"index":0}]}"#).unwrap();
        assert!(matches!(
            order_and_normalize(response, 2),
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }
}
