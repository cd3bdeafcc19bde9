//! CV Parser — turns raw résumé text into a validated `StructuredCandidate`.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::NO_FABRICATION_INSTRUCTION;
use crate::llm_client::LlmClient;
use crate::models::StructuredCandidate;
use crate::optimization::parse_model_json;
use crate::optimization::prompts::{CV_PARSE_PROMPT_TEMPLATE, CV_PARSE_SYSTEM};
use crate::optimization::retry::RetryPolicy;

pub struct CvParser {
    llm: LlmClient,
    retry: RetryPolicy,
}

impl CvParser {
    pub fn new(llm: LlmClient, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    /// Parses raw CV text. Each attempt is a fresh model call; the last
    /// attempt's error is returned once the budget is spent.
    pub async fn parse(&self, raw_text: &str) -> Result<StructuredCandidate, AppError> {
        info!("Parsing CV ({} chars)", raw_text.len());

        let prompt = CV_PARSE_PROMPT_TEMPLATE
            .replace("{no_fabrication}", NO_FABRICATION_INSTRUCTION)
            .replace("{cv_text}", raw_text);

        let mut candidate = self
            .retry
            .run("cv_parser", |_| self.attempt(&prompt))
            .await
            .into_result()?;

        candidate.raw_text = raw_text.to_string();

        info!(
            "CV parsed: {} sections, {} hard skills",
            candidate.sections.len(),
            candidate.hard_skills.len()
        );
        Ok(candidate)
    }

    async fn attempt(&self, prompt: &str) -> Result<StructuredCandidate, AppError> {
        let text = self.llm.complete(CV_PARSE_SYSTEM, prompt).await?;
        let candidate: StructuredCandidate = parse_model_json(&text, AppError::Parsing)?;
        candidate
            .validate()
            .map_err(|e| AppError::Parsing(format!("Schema validation failed: {e}")))?;
        Ok(candidate)
    }
}
