//! Narrative Generator — short plain-text summary for the candidate.
//!
//! Never fails the run: any error is logged and an empty narrative returned.

use tracing::{info, warn};

use crate::llm_client::LlmClient;
use crate::models::{ExplanationReport, ImprovedScore, OptimizedCandidate};
use crate::optimization::prompts::{NARRATIVE_PROMPT_TEMPLATE, NARRATIVE_SYSTEM};

const MAX_LISTED_CHANGES: usize = 5;

pub struct NarrativeGenerator {
    llm: LlmClient,
}

fn percent(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}

pub fn build_prompt(
    improved: &ImprovedScore,
    explanation: &ExplanationReport,
    optimized: &OptimizedCandidate,
) -> String {
    let changes = if optimized.changes.is_empty() {
        "None listed".to_string()
    } else {
        optimized
            .changes
            .iter()
            .take(MAX_LISTED_CHANGES)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ")
    };

    NARRATIVE_PROMPT_TEMPLATE
        .replace("{before}", &percent(improved.before.overall))
        .replace("{after}", &percent(improved.after.overall))
        .replace("{delta}", &format!("{:+.1}%", improved.delta * 100.0))
        .replace("{gap_count}", &explanation.mismatches.len().to_string())
        .replace("{changes}", &changes)
}

impl NarrativeGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub async fn generate(
        &self,
        improved: &ImprovedScore,
        explanation: &ExplanationReport,
        optimized: &OptimizedCandidate,
    ) -> String {
        let prompt = build_prompt(improved, explanation, optimized);
        match self.llm.complete(NARRATIVE_SYSTEM, &prompt).await {
            Ok(text) => {
                info!("Narrative generated ({} chars)", text.len());
                text
            }
            Err(e) => {
                warn!("Narrative generation failed, continuing without it: {e}");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm_client::mock::ScriptedProvider;
    use crate::models::SimilarityScore;
    use crate::optimization::fixtures::NARRATIVE_TEXT;

    fn improved() -> ImprovedScore {
        ImprovedScore {
            before: SimilarityScore::embedding_only(0.5, vec![]),
            after: SimilarityScore::embedding_only(0.7, vec![]),
            delta: 0.2,
        }
    }

    fn optimized(changes: usize) -> OptimizedCandidate {
        OptimizedCandidate {
            changes: (1..=changes).map(|i| format!("change {i}")).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_prompt_lists_first_five_changes() {
        let prompt = build_prompt(&improved(), &ExplanationReport::default(), &optimized(7));

        assert!(prompt.contains("Score before: 50%"));
        assert!(prompt.contains("Score after:  70%"));
        assert!(prompt.contains("Delta: +20.0%"));
        assert!(prompt.contains("change 5"));
        assert!(!prompt.contains("change 6"));
    }

    #[test]
    fn test_prompt_without_changes() {
        let prompt = build_prompt(&improved(), &ExplanationReport::default(), &optimized(0));
        assert!(prompt.contains("Changes made: None listed"));
        assert!(prompt.contains("Gaps addressed: 0"));
    }

    #[tokio::test]
    async fn test_generate_returns_model_text() {
        let provider = Arc::new(ScriptedProvider::replies([NARRATIVE_TEXT]));
        let generator = NarrativeGenerator::new(LlmClient::new(provider));

        let text = generator
            .generate(&improved(), &ExplanationReport::default(), &optimized(1))
            .await;
        assert_eq!(text, NARRATIVE_TEXT);
    }

    #[tokio::test]
    async fn test_failure_yields_empty_string() {
        let provider = Arc::new(ScriptedProvider::always_failing());
        let generator = NarrativeGenerator::new(LlmClient::new(provider.clone()));

        let text = generator
            .generate(&improved(), &ExplanationReport::default(), &optimized(1))
            .await;
        assert_eq!(text, "");
        assert_eq!(provider.calls(), 1);
    }
}
