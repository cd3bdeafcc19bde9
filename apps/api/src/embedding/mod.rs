/// Embedding providers and the similarity math used by the deterministic
/// matcher.
///
/// Providers are expensive to construct (HTTP pools, model handles) and are
/// built once in `main`, then shared behind `Arc<dyn EmbeddingProvider>`.
/// Every provider returns unit-normalised vectors and is deterministic for
/// identical input.
use async_trait::async_trait;
use thiserror::Error;

pub mod hashing;
pub mod http;
#[cfg(test)]
pub mod mock;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbeddingProvider;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Cannot embed empty text")]
    EmptyInput,

    #[error("Embedding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds one non-empty text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds several texts, preserving order. Fails on an empty slice or
    /// any blank entry.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    /// Vector length; 0 when not yet known (remote providers learn it on
    /// the first response).
    fn dimensions(&self) -> usize;

    fn provider_name(&self) -> &str;
}

pub(crate) fn ensure_not_blank(text: &str) -> Result<(), EmbeddingError> {
    if text.trim().is_empty() {
        Err(EmbeddingError::EmptyInput)
    } else {
        Ok(())
    }
}

pub fn l2_normalize(vector: &mut [f32]) {
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Cosine similarity clamped to [0, 1].
///
/// Mismatched lengths or a zero vector score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}
