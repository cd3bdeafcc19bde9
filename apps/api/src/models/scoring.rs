use serde::{Deserialize, Serialize};

use super::candidate::SectionType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub section_type: SectionType,
    /// Cosine similarity against the job vector, in [0, 1].
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEvidence {
    pub skill: String,
    #[serde(default)]
    pub found_in_cv: bool,
    #[serde(default)]
    pub cv_evidence: String,
}

/// Field-by-field comparison produced by the generative match analyzer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchAnalysis {
    pub skills_match_score: f64,
    pub experience_match_score: f64,
    pub education_match_score: f64,
    pub languages_match_score: f64,
    /// Always computed locally from the four sub-scores.
    pub overall_llm_score: f64,
    pub skill_details: Vec<SkillEvidence>,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub reasoning: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub overall: f64,
    #[serde(default)]
    pub section_scores: Vec<SectionScore>,
    /// Pure cosine-similarity score before blending.
    #[serde(default)]
    pub embedding_score: Option<f64>,
    #[serde(default)]
    pub analysis: Option<MatchAnalysis>,
}

impl SimilarityScore {
    pub fn embedding_only(overall: f64, section_scores: Vec<SectionScore>) -> Self {
        Self {
            overall,
            section_scores,
            embedding_score: Some(overall),
            analysis: None,
        }
    }
}

/// Rounds to four decimal places.
pub fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
