//! Fixed text→vector embedder for matcher tests.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{ensure_not_blank, l2_normalize, EmbeddingError, EmbeddingProvider};

pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    dimensions: usize,
}

impl TableEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            table: HashMap::new(),
            dimensions,
        }
    }

    /// Registers a vector (normalised on insert) for an exact text.
    pub fn with(mut self, text: &str, mut vector: Vec<f32>) -> Self {
        l2_normalize(&mut vector);
        self.table.insert(text.to_string(), vector);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        ensure_not_blank(text)?;
        self.table
            .get(text)
            .cloned()
            .ok_or_else(|| EmbeddingError::InvalidResponse(format!("no vector for {text:?}")))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registered_text_is_normalised_and_unknown_text_fails() {
        let embedder = TableEmbedder::new(2).with("known", vec![3.0, 4.0]);

        assert_eq!(embedder.embed("known").await.unwrap(), vec![0.6, 0.8]);
        assert!(matches!(
            embedder.embed("unknown").await,
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }
}
