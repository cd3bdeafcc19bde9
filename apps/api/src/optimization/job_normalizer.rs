//! Job Normalizer — turns a raw job posting into a validated `StructuredPosting`.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::StructuredPosting;
use crate::optimization::parse_model_json;
use crate::optimization::prompts::{JOB_NORMALIZE_PROMPT_TEMPLATE, JOB_NORMALIZE_SYSTEM};
use crate::optimization::retry::RetryPolicy;

pub struct JobNormalizer {
    llm: LlmClient,
    retry: RetryPolicy,
}

impl JobNormalizer {
    pub fn new(llm: LlmClient, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    pub async fn normalize(&self, raw_text: &str) -> Result<StructuredPosting, AppError> {
        info!("Normalizing job posting ({} chars)", raw_text.len());

        let prompt = JOB_NORMALIZE_PROMPT_TEMPLATE.replace("{job_text}", raw_text);

        let mut posting = self
            .retry
            .run("job_normalizer", |_| self.attempt(&prompt))
            .await
            .into_result()?;

        posting.raw_text = raw_text.to_string();

        info!(
            "Job normalized: title={:?}, {} required skills",
            posting.title,
            posting.required_skills.len()
        );
        Ok(posting)
    }

    async fn attempt(&self, prompt: &str) -> Result<StructuredPosting, AppError> {
        let text = self.llm.complete(JOB_NORMALIZE_SYSTEM, prompt).await?;
        let posting: StructuredPosting = parse_model_json(&text, AppError::Normalization)?;
        posting
            .validate()
            .map_err(|e| AppError::Normalization(format!("Schema validation failed: {e}")))?;
        Ok(posting)
    }
}
