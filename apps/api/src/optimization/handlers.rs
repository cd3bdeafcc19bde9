use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{
    ComparisonReport, ExplanationReport, OptimizedCandidate, SimilarityScore, StructuredCandidate,
    StructuredPosting, ValidationReport,
};
use crate::state::AppState;

// ── Full run ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct OptimizeRequest {
    pub cv_text: String,
    pub job_text: String,
}

#[derive(Serialize)]
pub struct OptimizeResponse {
    pub report: ComparisonReport,
}

/// POST /api/v1/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let report = state.pipeline.run(&req.cv_text, &req.job_text).await?;
    Ok(Json(OptimizeResponse { report }))
}

// ── Staged pipeline ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ParseCvRequest {
    pub cv_text: String,
}

/// POST /api/v1/pipeline/parse-cv
pub async fn handle_parse_cv(
    State(state): State<AppState>,
    Json(req): Json<ParseCvRequest>,
) -> Result<Json<StructuredCandidate>, AppError> {
    let candidate = state.pipeline.parse_cv(&req.cv_text).await?;
    Ok(Json(candidate))
}

#[derive(Deserialize)]
pub struct NormalizeJobRequest {
    pub job_text: String,
}

/// POST /api/v1/pipeline/normalize-job
pub async fn handle_normalize_job(
    State(state): State<AppState>,
    Json(req): Json<NormalizeJobRequest>,
) -> Result<Json<StructuredPosting>, AppError> {
    let posting = state.pipeline.normalize_job(&req.job_text).await?;
    Ok(Json(posting))
}

#[derive(Deserialize)]
pub struct MatchRequest {
    pub candidate: StructuredCandidate,
    pub posting: StructuredPosting,
}

/// POST /api/v1/pipeline/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<SimilarityScore>, AppError> {
    let score = state.pipeline.score(&req.candidate, &req.posting).await?;
    Ok(Json(score))
}

#[derive(Deserialize)]
pub struct ExplainRequest {
    pub candidate: StructuredCandidate,
    pub posting: StructuredPosting,
    pub score: SimilarityScore,
}

/// POST /api/v1/pipeline/explain
pub async fn handle_explain(
    State(state): State<AppState>,
    Json(req): Json<ExplainRequest>,
) -> Result<Json<ExplanationReport>, AppError> {
    let explanation = state
        .pipeline
        .explain(&req.candidate, &req.posting, &req.score)
        .await?;
    Ok(Json(explanation))
}

#[derive(Deserialize)]
pub struct RewriteRequest {
    pub candidate: StructuredCandidate,
    pub posting: StructuredPosting,
    pub explanation: ExplanationReport,
}

/// POST /api/v1/pipeline/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Json(req): Json<RewriteRequest>,
) -> Result<Json<OptimizedCandidate>, AppError> {
    let optimized = state
        .pipeline
        .rewrite(&req.candidate, &req.posting, &req.explanation)
        .await?;
    Ok(Json(optimized))
}

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub original: StructuredCandidate,
    pub optimized: OptimizedCandidate,
}

/// POST /api/v1/pipeline/validate
/// Always 200: violations are reported, not raised.
pub async fn handle_validate(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> Json<ValidationReport> {
    Json(state.pipeline.validate(&req.original, &req.optimized))
}

#[derive(Deserialize)]
pub struct CompareRequest {
    pub original: StructuredCandidate,
    pub optimized: OptimizedCandidate,
    pub posting: StructuredPosting,
    pub original_score: SimilarityScore,
    #[serde(default)]
    pub explanation: ExplanationReport,
}

/// POST /api/v1/pipeline/compare
pub async fn handle_compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Json<ComparisonReport>, AppError> {
    let report = state
        .pipeline
        .compare(
            &req.original,
            req.optimized,
            &req.posting,
            &req.original_score,
            req.explanation,
        )
        .await?;
    Ok(Json(report))
}
