//! Pipeline Orchestrator — the fixed nine-step run.
//!
//! parse CV → normalize job → score → explain → rewrite → validate (fatal)
//! → rescore → narrative (non-fatal) → assemble report.
//!
//! Steps run strictly in order. There are no retries here beyond what each
//! stage does internally, and a failure never yields a partial report.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::{
    ComparisonReport, ExplanationReport, OptimizedCandidate, SimilarityScore, StructuredCandidate,
    StructuredPosting, ValidationReport,
};
use crate::optimization::blend::{BlendWeights, ScoreBlender};
use crate::optimization::cv_parser::CvParser;
use crate::optimization::explainer::GapExplainer;
use crate::optimization::job_normalizer::JobNormalizer;
use crate::optimization::match_analyzer::{LlmMatchAnalyzer, MatchAnalyzer};
use crate::optimization::matcher::SemanticMatcher;
use crate::optimization::narrative::NarrativeGenerator;
use crate::optimization::rescorer::Rescorer;
use crate::optimization::retry::RetryPolicy;
use crate::optimization::rewriter::CvRewriter;
use crate::optimization::validator;

/// Raw inputs shorter than this (after trimming) are rejected up front.
pub const MIN_INPUT_CHARS: usize = 10;

pub fn ensure_input(field: &str, text: &str) -> Result<(), AppError> {
    if text.trim().chars().count() < MIN_INPUT_CHARS {
        return Err(AppError::BadRequest(format!(
            "{field} must contain at least {MIN_INPUT_CHARS} characters"
        )));
    }
    Ok(())
}

pub struct Pipeline {
    cv_parser: CvParser,
    job_normalizer: JobNormalizer,
    blender: ScoreBlender,
    explainer: GapExplainer,
    rewriter: CvRewriter,
    rescorer: Rescorer,
    narrative: NarrativeGenerator,
}

impl Pipeline {
    /// Wires every stage around one gateway and one shared embedder.
    /// The same blender instance backs initial scoring and rescoring.
    pub fn new(
        llm: LlmClient,
        embedder: Arc<dyn EmbeddingProvider>,
        retry: RetryPolicy,
        weights: BlendWeights,
    ) -> Self {
        let analyzer: Arc<dyn MatchAnalyzer> = Arc::new(LlmMatchAnalyzer::new(llm.clone(), retry));
        let blender = ScoreBlender::new(SemanticMatcher::new(embedder), Some(analyzer), weights);

        Self {
            cv_parser: CvParser::new(llm.clone(), retry),
            job_normalizer: JobNormalizer::new(llm.clone(), retry),
            rescorer: Rescorer::new(blender.clone()),
            blender,
            explainer: GapExplainer::new(llm.clone(), retry),
            rewriter: CvRewriter::new(llm.clone(), retry),
            narrative: NarrativeGenerator::new(llm),
        }
    }

    pub fn from_config(
        config: &Config,
        llm: LlmClient,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self::new(
            llm,
            embedder,
            RetryPolicy::with_extra_attempts(config.agent_max_retries),
            BlendWeights::from_embedding_weight(config.blend_embedding_weight),
        )
    }

    // ── Granular stages ─────────────────────────────────────────────────

    pub async fn parse_cv(&self, cv_text: &str) -> Result<StructuredCandidate, AppError> {
        ensure_input("cv_text", cv_text)?;
        self.cv_parser.parse(cv_text).await
    }

    pub async fn normalize_job(&self, job_text: &str) -> Result<StructuredPosting, AppError> {
        ensure_input("job_text", job_text)?;
        self.job_normalizer.normalize(job_text).await
    }

    pub async fn score(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
    ) -> Result<SimilarityScore, AppError> {
        self.blender.score(candidate, posting).await
    }

    pub async fn explain(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
        score: &SimilarityScore,
    ) -> Result<ExplanationReport, AppError> {
        self.explainer.explain(candidate, posting, score).await
    }

    pub async fn rewrite(
        &self,
        candidate: &StructuredCandidate,
        posting: &StructuredPosting,
        explanation: &ExplanationReport,
    ) -> Result<OptimizedCandidate, AppError> {
        self.rewriter.rewrite(candidate, posting, explanation).await
    }

    /// Report only; the gate is applied by [`Pipeline::run`].
    pub fn validate(
        &self,
        original: &StructuredCandidate,
        optimized: &OptimizedCandidate,
    ) -> ValidationReport {
        validator::validate(original, optimized)
    }

    /// Rescore, narrative and report assembly (steps 7–9).
    pub async fn compare(
        &self,
        original: &StructuredCandidate,
        optimized: OptimizedCandidate,
        posting: &StructuredPosting,
        original_score: &SimilarityScore,
        explanation: ExplanationReport,
    ) -> Result<ComparisonReport, AppError> {
        let improved_score = self
            .rescorer
            .rescore(original, &optimized, posting, original_score)
            .await?;

        let narrative = self
            .narrative
            .generate(&improved_score, &explanation, &optimized)
            .await;

        Ok(ComparisonReport {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            improved_score,
            explanation,
            optimized,
            narrative,
        })
    }

    // ── Full run ────────────────────────────────────────────────────────

    pub async fn run(&self, cv_text: &str, job_text: &str) -> Result<ComparisonReport, AppError> {
        ensure_input("cv_text", cv_text)?;
        ensure_input("job_text", job_text)?;

        let run_id = Uuid::new_v4();
        self.execute(run_id, cv_text, job_text)
            .instrument(info_span!("pipeline", run_id = %run_id))
            .await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        cv_text: &str,
        job_text: &str,
    ) -> Result<ComparisonReport, AppError> {
        info!("Step 1/9: parsing CV");
        let candidate = self.cv_parser.parse(cv_text).await?;

        info!("Step 2/9: normalizing job");
        let posting = self.job_normalizer.normalize(job_text).await?;

        info!("Step 3/9: scoring");
        let score = self.score(&candidate, &posting).await?;

        info!("Step 4/9: explaining gaps");
        let explanation = self.explain(&candidate, &posting, &score).await?;

        info!("Step 5/9: rewriting");
        let optimized = self.rewrite(&candidate, &posting, &explanation).await?;

        info!("Step 6/9: validating");
        let validation = self.validate(&candidate, &optimized);
        if !validation.is_valid {
            return Err(AppError::RuleViolation {
                violations: validation.violations,
            });
        }

        info!("Steps 7-9/9: rescoring, narrative, report");
        let mut report = self
            .compare(&candidate, optimized, &posting, &score, explanation)
            .await?;
        report.run_id = run_id;

        info!(
            "Pipeline complete: {:.4} -> {:.4} (delta {:+.4})",
            report.improved_score.before.overall,
            report.improved_score.after.overall,
            report.improved_score.delta
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::llm_client::mock::ScriptedProvider;
    use crate::models::scoring::round4;
    use crate::optimization::fixtures::{
        self, ANALYSIS_JSON, CANDIDATE_JSON, CV_TEXT, EXPLANATION_JSON, JOB_TEXT, NARRATIVE_TEXT,
        POSTING_JSON, REWRITE_JSON, SHRUNK_REWRITE_JSON,
    };

    fn pipeline(provider: &Arc<ScriptedProvider>) -> Pipeline {
        Pipeline::new(
            LlmClient::new(provider.clone()),
            Arc::new(HashingEmbedder::new(256)),
            RetryPolicy::with_extra_attempts(2),
            BlendWeights::default(),
        )
    }

    #[tokio::test]
    async fn test_full_run_produces_report() {
        let provider = Arc::new(ScriptedProvider::replies([
            CANDIDATE_JSON,
            POSTING_JSON,
            ANALYSIS_JSON,
            EXPLANATION_JSON,
            REWRITE_JSON,
            ANALYSIS_JSON,
            NARRATIVE_TEXT,
        ]));

        let report = pipeline(&provider).run(CV_TEXT, JOB_TEXT).await.unwrap();

        assert_eq!(provider.calls(), 7);
        let improved = &report.improved_score;
        assert!(improved.before.analysis.is_some());
        assert!(improved.after.analysis.is_some());
        assert!((0.0..=1.0).contains(&improved.after.overall));
        assert_eq!(
            improved.delta,
            round4(improved.after.overall - improved.before.overall)
        );
        assert_eq!(report.explanation.mismatches.len(), 2);
        assert_eq!(report.optimized.contact, fixtures::candidate().contact);
        assert_eq!(report.narrative, NARRATIVE_TEXT);
    }

    #[tokio::test]
    async fn test_validation_failure_aborts_before_rescoring() {
        let provider = Arc::new(ScriptedProvider::replies([
            CANDIDATE_JSON,
            POSTING_JSON,
            ANALYSIS_JSON,
            EXPLANATION_JSON,
            SHRUNK_REWRITE_JSON,
        ]));

        let err = pipeline(&provider).run(CV_TEXT, JOB_TEXT).await.unwrap_err();

        match err {
            AppError::RuleViolation { violations } => {
                assert!(violations.iter().any(|v| v.contains("experience")));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // No rescore analysis, no narrative.
        assert_eq!(provider.calls(), 5);
    }

    #[tokio::test]
    async fn test_narrative_failure_is_not_fatal() {
        let provider = Arc::new(ScriptedProvider::replies([
            CANDIDATE_JSON,
            POSTING_JSON,
            ANALYSIS_JSON,
            EXPLANATION_JSON,
            REWRITE_JSON,
            ANALYSIS_JSON,
        ]));

        let report = pipeline(&provider).run(CV_TEXT, JOB_TEXT).await.unwrap();
        assert_eq!(report.narrative, "");
        assert_eq!(provider.calls(), 7);
    }

    #[tokio::test]
    async fn test_short_input_rejected_before_any_call() {
        let provider = Arc::new(ScriptedProvider::replies([CANDIDATE_JSON]));

        let err = pipeline(&provider).run("too short", JOB_TEXT).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_cv_parse_failure_propagates() {
        let provider = Arc::new(ScriptedProvider::replies(["nope", "nope", "nope"]));

        let err = pipeline(&provider).run(CV_TEXT, JOB_TEXT).await.unwrap_err();
        assert!(matches!(err, AppError::Parsing(_)));
        assert_eq!(provider.calls(), 3);
    }
}
