//! Semantic Matcher — deterministic, embedding-only CV ↔ job scoring.
//!
//! Never calls the generation gateway. With a deterministic embedding
//! provider the result is a pure function of the two records.

use std::sync::Arc;

use tracing::{debug, info};

use crate::embedding::{cosine_similarity, EmbeddingError, EmbeddingProvider};
use crate::errors::AppError;
use crate::models::{
    CvSection, SectionScore, SectionType, SimilarityScore, StructuredCandidate, StructuredPosting,
};

/// Weight of a section type in the overall score.
pub fn section_weight(section_type: SectionType) -> f64 {
    match section_type {
        SectionType::Experience => 0.30,
        SectionType::Skills => 0.30,
        SectionType::Education => 0.15,
        SectionType::Summary => 0.10,
        SectionType::Certifications => 0.05,
        SectionType::Languages => 0.05,
        SectionType::Other => 0.05,
        // not in the table
        SectionType::Projects => 0.05,
    }
}

/// Weighted mean of section scores, normalised by the weights actually
/// present. No sections scores 0.0.
pub fn weighted_overall(section_scores: &[SectionScore]) -> f64 {
    let (weighted_sum, total_weight) =
        section_scores
            .iter()
            .fold((0.0, 0.0), |(sum, total), s| {
                let w = section_weight(s.section_type);
                (sum + s.score * w, total + w)
            });

    if total_weight > 0.0 {
        (weighted_sum / total_weight).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[derive(Clone)]
pub struct SemanticMatcher {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SemanticMatcher {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    pub async fn score(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
    ) -> Result<SimilarityScore, AppError> {
        let job_text = posting.embedding_text();
        if job_text.is_empty() {
            return Err(AppError::Similarity(
                "Job posting produced empty embedding text".into(),
            ));
        }
        let job_vector = self.embedder.embed(&job_text).await?;

        let dims = self.embedder.dimensions();
        if dims != 0 && job_vector.len() != dims {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {dims}-dimensional vectors, got {}",
                job_vector.len()
            ))
            .into());
        }

        let mut section_scores = self.score_sections(candidate, &job_vector).await?;

        // Only add the enriched skills score when no skills section exists,
        // so there is never more than one skills entry.
        if !section_scores
            .iter()
            .any(|s| s.section_type == SectionType::Skills)
        {
            if let Some(score) = self.skills_score(candidate, posting).await? {
                section_scores.push(SectionScore {
                    section_type: SectionType::Skills,
                    score,
                });
            }
        }

        let overall = weighted_overall(&section_scores);
        info!(
            "Embedding score {:.4} over {} sections",
            overall,
            section_scores.len()
        );

        Ok(SimilarityScore::embedding_only(overall, section_scores))
    }

    async fn score_sections(
        &self,
        candidate: &StructuredCandidate,
        job_vector: &[f32],
    ) -> Result<Vec<SectionScore>, AppError> {
        let sections: Vec<&CvSection> = candidate
            .sections
            .iter()
            .filter(|s| !s.is_blank())
            .collect();
        if sections.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = sections.iter().map(|s| s.text.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;
        if vectors.len() != sections.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} section vectors, got {}",
                sections.len(),
                vectors.len()
            ))
            .into());
        }

        Ok(sections
            .iter()
            .zip(&vectors)
            .map(|(section, vector)| {
                let score = cosine_similarity(vector, job_vector);
                debug!("section {} scored {:.4}", section.section_type, score);
                SectionScore {
                    section_type: section.section_type,
                    score,
                }
            })
            .collect())
    }

    async fn skills_score(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
    ) -> Result<Option<f64>, AppError> {
        let cv_skills = candidate.skills_text();
        let job_skills = posting.skills_text();
        if cv_skills.is_empty() || job_skills.is_empty() {
            return Ok(None);
        }

        let cv_vector = self.embedder.embed(&cv_skills).await?;
        let job_vector = self.embedder.embed(&job_skills).await?;
        Ok(Some(cosine_similarity(&cv_vector, &job_vector)))
    }
}
