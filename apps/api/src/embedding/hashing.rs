use std::collections::HashMap;

use async_trait::async_trait;

use super::{ensure_not_blank, l2_normalize, EmbeddingError, EmbeddingProvider};

/// Offline bag-of-words embedder.
///
/// Each lowercase alphanumeric term is hashed (djb2) into a bucket and its
/// term frequency added there; the vector is then L2-normalised. Counts are
/// non-negative, so cosine scores already fall in [0, 1].
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let lowered = text.to_lowercase();
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            *tf.entry(word).or_insert(0) += 1;
        }

        // Punctuation-only input still gets a stable, non-zero vector.
        if tf.is_empty() {
            tf.insert(lowered.trim(), 1);
        }

        for (term, count) in &tf {
            let idx = djb2(term) % self.dimensions;
            vector[idx] += *count as f32;
        }

        l2_normalize(&mut vector);
        vector
    }
}

fn djb2(s: &str) -> usize {
    let mut hash: usize = 5381;
    for b in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as usize);
    }
    hash
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        ensure_not_blank(text)?;
        Ok(self.vectorize(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "hashing"
    }
}
