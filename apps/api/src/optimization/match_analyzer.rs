//! Generative Match Analyzer — field-by-field CV ↔ job comparison via the LLM.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::scoring::round4;
use crate::models::{MatchAnalysis, StructuredCandidate, StructuredPosting};
use crate::optimization::parse_model_json;
use crate::optimization::prompts::MATCH_ANALYSIS_SYSTEM;
use crate::optimization::retry::{RetryOutcome, RetryPolicy};

const AGENT: &str = "match_analyzer";

const SKILLS_WEIGHT: f64 = 0.40;
const EXPERIENCE_WEIGHT: f64 = 0.30;
const EDUCATION_WEIGHT: f64 = 0.15;
const LANGUAGES_WEIGHT: f64 = 0.15;

/// Optional generative scorer used by the Score Blender.
///
/// Failures here are recoverable one level up: the blender falls back to the
/// embedding-only score.
#[async_trait]
pub trait MatchAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
    ) -> Result<MatchAnalysis, AppError>;
}

/// Weighted blend of the four sub-scores. The model's own overall is ignored.
pub fn analysis_overall(analysis: &MatchAnalysis) -> f64 {
    round4(
        SKILLS_WEIGHT * analysis.skills_match_score
            + EXPERIENCE_WEIGHT * analysis.experience_match_score
            + EDUCATION_WEIGHT * analysis.education_match_score
            + LANGUAGES_WEIGHT * analysis.languages_match_score,
    )
}

fn check_range(name: &str, value: f64) -> Result<(), AppError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AppError::agent(
            AGENT,
            format!("{name} must be within [0, 1], got {value}"),
        ))
    }
}

pub struct LlmMatchAnalyzer {
    llm: LlmClient,
    retry: RetryPolicy,
}

impl LlmMatchAnalyzer {
    pub fn new(llm: LlmClient, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    /// Both records as compact JSON, without the raw source text.
    fn build_user_message(
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
    ) -> Result<String, AppError> {
        let mut cv = serde_json::to_value(candidate).map_err(anyhow::Error::from)?;
        let mut job = serde_json::to_value(posting).map_err(anyhow::Error::from)?;
        for value in [&mut cv, &mut job] {
            if let Value::Object(map) = value {
                map.remove("raw_text");
            }
        }
        serde_json::to_string_pretty(&json!({ "cv": cv, "job": job }))
            .map_err(|e| AppError::Internal(e.into()))
    }

    async fn attempt(&self, user: &str) -> Result<MatchAnalysis, AppError> {
        let text = self.llm.complete(MATCH_ANALYSIS_SYSTEM, user).await?;
        let mut analysis: MatchAnalysis =
            parse_model_json(&text, |msg| AppError::agent(AGENT, msg))?;

        check_range("skills_match_score", analysis.skills_match_score)?;
        check_range("experience_match_score", analysis.experience_match_score)?;
        check_range("education_match_score", analysis.education_match_score)?;
        check_range("languages_match_score", analysis.languages_match_score)?;

        analysis.overall_llm_score = analysis_overall(&analysis);
        Ok(analysis)
    }
}

#[async_trait]
impl MatchAnalyzer for LlmMatchAnalyzer {
    async fn analyze(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
    ) -> Result<MatchAnalysis, AppError> {
        info!("Running generative match analysis");
        let user = Self::build_user_message(candidate, posting)?;

        match self.retry.run(AGENT, |_| self.attempt(&user)).await {
            RetryOutcome::Succeeded { value, attempts } => {
                info!(
                    "Match analysis done: overall={:.4}, skills={:.2} (attempt {})",
                    value.overall_llm_score, value.skills_match_score, attempts
                );
                Ok(value)
            }
            RetryOutcome::Exhausted {
                last_error,
                attempts,
            } => Err(AppError::agent(
                AGENT,
                format!("failed after {attempts} attempts: {last_error}"),
            )),
            RetryOutcome::Aborted { error, .. } => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::mock::ScriptedProvider;
    use crate::optimization::fixtures::{self, ANALYSIS_JSON};

    fn analyzer(provider: &Arc<ScriptedProvider>) -> LlmMatchAnalyzer {
        LlmMatchAnalyzer::new(
            LlmClient::new(provider.clone()),
            RetryPolicy::with_extra_attempts(2),
        )
    }

    #[tokio::test]
    async fn test_overall_is_computed_locally() {
        let provider = Arc::new(ScriptedProvider::replies([ANALYSIS_JSON]));
        let analysis = analyzer(&provider)
            .analyze(&fixtures::candidate(), &fixtures::posting())
            .await
            .unwrap();

        // 0.4*0.8 + 0.3*0.7 + 0.15*1.0 + 0.15*1.0, not the model's 0.99
        assert_eq!(analysis.overall_llm_score, 0.83);
        assert_eq!(analysis.skill_details.len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_score_triggers_retry() {
        let bad = r#"{"skills_match_score": 1.7, "experience_match_score": 0.5,
                      "education_match_score": 0.5, "languages_match_score": 0.5}"#;
        let provider = Arc::new(ScriptedProvider::replies([bad, ANALYSIS_JSON]));

        let analysis = analyzer(&provider)
            .analyze(&fixtures::candidate(), &fixtures::posting())
            .await
            .unwrap();
        assert_eq!(analysis.skills_match_score, 0.8);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_is_agent_execution_error() {
        let provider = Arc::new(ScriptedProvider::replies(["nope", "nope", "nope"]));

        let err = analyzer(&provider)
            .analyze(&fixtures::candidate(), &fixtures::posting())
            .await
            .unwrap_err();

        match err {
            AppError::AgentExecution { agent, message } => {
                assert_eq!(agent, "match_analyzer");
                assert!(message.contains("3 attempts"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.calls(), 3);
    }

    #[test]
    fn test_user_message_omits_raw_text() {
        let message =
            LlmMatchAnalyzer::build_user_message(&fixtures::candidate(), &fixtures::posting())
                .unwrap();
        assert!(!message.contains("raw_text"));
        assert!(message.contains("\"hard_skills\""));
    }
}
