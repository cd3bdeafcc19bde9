//! Rescorer — scores the rewritten CV with the same blender as the original.

use tracing::info;

use crate::errors::AppError;
use crate::models::scoring::round4;
use crate::models::{
    ImprovedScore, OptimizedCandidate, SimilarityScore, StructuredCandidate, StructuredPosting,
};
use crate::optimization::blend::ScoreBlender;

/// `after - before`, rounded to four decimals.
pub fn improvement_delta(before: f64, after: f64) -> f64 {
    round4(after - before)
}

/// Rewritten sections and contact on top of the original's enriched fields.
pub fn promote(original: &StructuredCandidate, optimized: &OptimizedCandidate) -> StructuredCandidate {
    StructuredCandidate {
        contact: optimized.contact.clone(),
        sections: optimized.sections.clone(),
        ..original.clone()
    }
}

#[derive(Clone)]
pub struct Rescorer {
    blender: ScoreBlender,
}

impl Rescorer {
    pub fn new(blender: ScoreBlender) -> Self {
        Self { blender }
    }

    pub async fn rescore(
        &self,
        original: &StructuredCandidate,
        optimized: &OptimizedCandidate,
        posting: &StructuredPosting,
        original_score: &SimilarityScore,
    ) -> Result<ImprovedScore, AppError> {
        let promoted = promote(original, optimized);
        let after = self.blender.score(&promoted, posting).await?;
        let delta = improvement_delta(original_score.overall, after.overall);

        info!(
            "Rescored: {:.4} -> {:.4} (delta {:+.4})",
            original_score.overall, after.overall, delta
        );

        Ok(ImprovedScore {
            before: original_score.clone(),
            after,
            delta,
        })
    }
}
