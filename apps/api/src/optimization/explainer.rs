//! Gap Explainer — turns a blended score into actionable mismatches.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::{
    ExplanationReport, MatchAnalysis, SimilarityScore, StructuredCandidate, StructuredPosting,
};
use crate::optimization::prompts::{
    EXPLAIN_ANALYSIS_TEMPLATE, EXPLAIN_CONTEXT_TEMPLATE, EXPLAIN_PROMPT_TEMPLATE, EXPLAIN_SYSTEM,
};
use crate::optimization::retry::RetryPolicy;
use crate::optimization::{parse_model_json, truncate_chars};

const AGENT: &str = "score_explainer";
const SECTION_PREVIEW_CHARS: usize = 300;

pub struct GapExplainer {
    llm: LlmClient,
    retry: RetryPolicy,
}

fn list_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

fn years_or_unknown(years: Option<f64>) -> String {
    years.map_or_else(|| "unknown".to_string(), |y| format!("{y}"))
}

fn fallback_none(text: &str) -> &str {
    if text.trim().is_empty() {
        "none"
    } else {
        text
    }
}

fn analysis_block(analysis: &MatchAnalysis) -> String {
    let skill_details = analysis
        .skill_details
        .iter()
        .map(|d| {
            let status = if d.found_in_cv { "found" } else { "missing" };
            format!("  {}: {} {}", d.skill, status, d.cv_evidence)
        })
        .collect::<Vec<_>>()
        .join("\n");

    EXPLAIN_ANALYSIS_TEMPLATE
        .replace("{skills}", &format!("{:.2}", analysis.skills_match_score))
        .replace("{experience}", &format!("{:.2}", analysis.experience_match_score))
        .replace("{education}", &format!("{:.2}", analysis.education_match_score))
        .replace("{languages}", &format!("{:.2}", analysis.languages_match_score))
        .replace("{strengths}", &list_or_none(&analysis.strengths))
        .replace("{gaps}", &list_or_none(&analysis.gaps))
        .replace("{reasoning}", fallback_none(&analysis.reasoning))
        .replace("{skill_details}", fallback_none(&skill_details))
}

/// Renders the explainer context: job requirements, the candidate's enriched
/// profile, section previews, scores and (when present) analyzer evidence.
pub fn build_context(
    candidate: &StructuredCandidate,
    posting: &StructuredPosting,
    score: &SimilarityScore,
) -> String {
    let required: Vec<String> = posting
        .required_skills
        .iter()
        .map(|s| {
            if s.required {
                s.skill.clone()
            } else {
                format!("{} (nice to have)", s.skill)
            }
        })
        .collect();

    let sections = candidate
        .sections
        .iter()
        .map(|s| {
            format!(
                "  [{}]: {}",
                s.section_type,
                truncate_chars(&s.text, SECTION_PREVIEW_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let section_scores: String = score
        .section_scores
        .iter()
        .map(|s| format!("  {}: {:.2}\n", s.section_type, s.score))
        .collect();

    let analysis = score
        .analysis
        .as_ref()
        .map(analysis_block)
        .unwrap_or_default();

    // Free-text values are substituted last.
    EXPLAIN_CONTEXT_TEMPLATE
        .replace("{job_required}", &list_or_none(&required))
        .replace("{job_hard}", &list_or_none(&posting.hard_skills))
        .replace("{job_soft}", &list_or_none(&posting.soft_skills))
        .replace("{job_tools}", &list_or_none(&posting.tools))
        .replace("{job_years}", &years_or_unknown(posting.min_years_experience))
        .replace("{job_education}", fallback_none(&posting.education_level))
        .replace("{job_languages}", &list_or_none(&posting.languages_required))
        .replace("{cv_hard}", &list_or_none(&candidate.hard_skills))
        .replace("{cv_soft}", &list_or_none(&candidate.soft_skills))
        .replace("{cv_tools}", &list_or_none(&candidate.tools))
        .replace("{cv_years}", &years_or_unknown(candidate.total_years_experience))
        .replace("{cv_education}", fallback_none(&candidate.education_level))
        .replace("{cv_languages}", &list_or_none(&candidate.languages_spoken))
        .replace("{overall}", &format!("{:.2}", score.overall))
        .replace("{section_scores}", &section_scores)
        .replace("{job_title}", &posting.title)
        .replace("{cv_name}", &candidate.contact.name)
        .replace("{cv_sections}", &sections)
        .replace("{analysis}", &analysis)
}

impl GapExplainer {
    pub fn new(llm: LlmClient, retry: RetryPolicy) -> Self {
        Self { llm, retry }
    }

    pub async fn explain(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
        score: &SimilarityScore,
    ) -> Result<ExplanationReport, AppError> {
        info!("Explaining gaps (overall score {:.4})", score.overall);

        let prompt =
            EXPLAIN_PROMPT_TEMPLATE.replace("{context}", &build_context(candidate, posting, score));

        let outcome = self.retry.run(AGENT, |_| self.attempt(&prompt)).await;
        let attempts = outcome.attempts();
        let report = outcome.into_result()?;

        info!(
            "Explanation ready: {} mismatches (attempt {})",
            report.mismatches.len(),
            attempts
        );
        Ok(report)
    }

    async fn attempt(&self, prompt: &str) -> Result<ExplanationReport, AppError> {
        let text = self.llm.complete(EXPLAIN_SYSTEM, prompt).await?;
        let report: ExplanationReport = parse_model_json(&text, |msg| AppError::agent(AGENT, msg))?;
        if let Some(idx) = report
            .mismatches
            .iter()
            .position(|m| m.field.trim().is_empty())
        {
            return Err(AppError::agent(
                AGENT,
                format!("mismatches[{idx}].field must not be empty"),
            ));
        }
        Ok(report)
    }
}
