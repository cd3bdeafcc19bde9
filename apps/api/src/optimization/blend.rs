//! Score Blender — combines the deterministic matcher with the optional
//! generative analyzer. Shared by initial scoring and rescoring so both use
//! the same weights.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::scoring::round4;
use crate::models::{SimilarityScore, StructuredCandidate, StructuredPosting};
use crate::optimization::match_analyzer::MatchAnalyzer;
use crate::optimization::matcher::SemanticMatcher;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub embedding: f64,
    pub generative: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self::from_embedding_weight(0.35)
    }
}

impl BlendWeights {
    /// The generative weight is the complement of the embedding weight.
    pub fn from_embedding_weight(embedding: f64) -> Self {
        let embedding = embedding.clamp(0.0, 1.0);
        Self {
            embedding,
            generative: 1.0 - embedding,
        }
    }

    pub fn blend(&self, embedding_score: f64, llm_score: f64) -> f64 {
        round4(self.embedding * embedding_score + self.generative * llm_score).clamp(0.0, 1.0)
    }
}

#[derive(Clone)]
pub struct ScoreBlender {
    matcher: SemanticMatcher,
    analyzer: Option<Arc<dyn MatchAnalyzer>>,
    weights: BlendWeights,
}

impl ScoreBlender {
    pub fn new(
        matcher: SemanticMatcher,
        analyzer: Option<Arc<dyn MatchAnalyzer>>,
        weights: BlendWeights,
    ) -> Self {
        Self {
            matcher,
            analyzer,
            weights,
        }
    }

    /// Matcher first, then the analyzer when one is configured.
    ///
    /// An analyzer failure is logged and the embedding-only score is
    /// returned unchanged. Matcher failures propagate.
    pub async fn score(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
    ) -> Result<SimilarityScore, AppError> {
        let mut score = self.matcher.score(candidate, posting).await?;

        let Some(analyzer) = &self.analyzer else {
            return Ok(score);
        };

        match analyzer.analyze(candidate, posting).await {
            Ok(analysis) => {
                let embedding_score = score.overall;
                score.overall = self
                    .weights
                    .blend(embedding_score, analysis.overall_llm_score);
                score.embedding_score = Some(embedding_score);
                info!(
                    "Blended score {:.4} (embedding {:.4}, llm {:.4})",
                    score.overall, embedding_score, analysis.overall_llm_score
                );
                score.analysis = Some(analysis);
            }
            Err(e) => {
                warn!("Match analyzer failed, using embedding-only score: {e}");
            }
        }

        Ok(score)
    }
}
