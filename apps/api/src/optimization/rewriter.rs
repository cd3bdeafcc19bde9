//! CV Rewriter — rephrases sections toward the job without inventing facts.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::NO_FABRICATION_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::{
    CvSection, ExplanationReport, OptimizedCandidate, StructuredCandidate, StructuredPosting,
};
use crate::optimization::parse_model_json;
use crate::optimization::prompts::{REWRITE_PROMPT_TEMPLATE, REWRITE_SYSTEM};
use crate::optimization::retry::RetryPolicy;

const AGENT: &str = "cv_rewriter";

/// What the model is allowed to produce. Contact details are never taken
/// from the model.
#[derive(Debug, Deserialize)]
struct RewriteOutput {
    #[serde(default)]
    sections: Vec<CvSection>,
    #[serde(default, alias = "changes_summary")]
    changes: Vec<String>,
}

pub struct CvRewriter {
    llm: LlmClient,
    retry: RetryPolicy,
}

fn format_gaps(explanation: &ExplanationReport) -> String {
    if explanation.mismatches.is_empty() {
        return "- none identified".to_string();
    }
    explanation
        .mismatches
        .iter()
        .map(|m| format!("- {}: {}", m.field, m.explanation))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_sections(sections: &[CvSection]) -> String {
    sections
        .iter()
        .map(|s| format!("[{}]\n{}", s.section_type, s.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(
    candidate: &StructuredCandidate,
    posting: &StructuredPosting,
    explanation: &ExplanationReport,
) -> String {
    let required: Vec<&str> = posting
        .required_skills
        .iter()
        .filter(|s| s.required)
        .map(|s| s.skill.as_str())
        .collect();

    REWRITE_PROMPT_TEMPLATE
        .replace("{job_title}", &posting.title)
        .replace("{required_skills}", &required.join(", "))
        .replace("{gaps}", &format_gaps(explanation))
        .replace("{sections}", &format_sections(&candidate.sections))
        .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
}

impl CvRewriter {
    pub fn new(llm: LlmClient, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    pub async fn rewrite(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
        explanation: &ExplanationReport,
    ) -> Result<OptimizedCandidate, AppError> {
        info!(
            "Rewriting {} sections for '{}'",
            candidate.sections.len(),
            posting.title
        );

        let prompt = build_prompt(candidate, posting, explanation);
        let outcome = self.retry.run(AGENT, |_| self.attempt(&prompt)).await;
        let attempts = outcome.attempts();
        let output = outcome.into_result()?;

        info!(
            "Rewrite produced {} sections, {} changes (attempt {})",
            output.sections.len(),
            output.changes.len(),
            attempts
        );
        Ok(OptimizedCandidate {
            contact: candidate.contact.clone(),
            sections: output.sections,
            changes: output.changes,
        })
    }

    async fn attempt(&self, prompt: &str) -> Result<RewriteOutput, AppError> {
        let text = self.llm.complete(REWRITE_SYSTEM, prompt).await?;
        let output: RewriteOutput = parse_model_json(&text, |msg| AppError::agent(AGENT, msg))?;
        if output.sections.is_empty() {
            return Err(AppError::agent(AGENT, "rewrite returned no sections"));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::mock::ScriptedProvider;
    use crate::models::SectionType;
    use crate::optimization::fixtures::{self, EXPLANATION_JSON, REWRITE_JSON};

    fn rewriter(provider: &Arc<ScriptedProvider>) -> CvRewriter {
        CvRewriter::new(
            LlmClient::new(provider.clone()),
            RetryPolicy::with_extra_attempts(2),
        )
    }

    fn explanation() -> ExplanationReport {
        serde_json::from_str(EXPLANATION_JSON).unwrap()
    }

    #[tokio::test]
    async fn test_contact_is_copied_from_input() {
        let provider = Arc::new(ScriptedProvider::replies([
            r#"{"contact": {"name": "Someone Else", "email": "x@y.z"},
                "sections": [{"section_type": "skills", "text": "Rust"}],
                "changes": []}"#,
        ]));
        let candidate = fixtures::candidate();

        let optimized = rewriter(&provider)
            .rewrite(&candidate, &fixtures::posting(), &explanation())
            .await
            .unwrap();

        assert_eq!(optimized.contact, candidate.contact);
        assert_eq!(optimized.sections[0].section_type, SectionType::Skills);
    }

    #[tokio::test]
    async fn test_rewrite_keeps_sections_and_changes() {
        let provider = Arc::new(ScriptedProvider::replies([REWRITE_JSON]));
        let optimized = rewriter(&provider)
            .rewrite(&fixtures::candidate(), &fixtures::posting(), &explanation())
            .await
            .unwrap();

        assert_eq!(optimized.sections.len(), 4);
        assert_eq!(optimized.changes.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_sections_retries() {
        let provider = Arc::new(ScriptedProvider::replies([
            r#"{"sections": [], "changes": []}"#,
            REWRITE_JSON,
        ]));
        rewriter(&provider)
            .rewrite(&fixtures::candidate(), &fixtures::posting(), &explanation())
            .await
            .unwrap();
        assert_eq!(provider.calls(), 2);
    }

    #[test]
    fn test_prompt_lists_required_skills_and_gaps() {
        let prompt = build_prompt(&fixtures::candidate(), &fixtures::posting(), &explanation());

        assert!(prompt.contains("Required skills: Rust, PostgreSQL, Kafka\n"));
        assert!(prompt.contains("- skills: Infrastructure-as-code"));
        assert!(prompt.contains("[experience]\nAcme Payments"));
        assert!(prompt.contains("Do NOT invent"));
    }
}
