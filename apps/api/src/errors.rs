use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::llm_client::GenerationError;

/// Application-level error type.
///
/// Every pipeline stage returns `Result<T, AppError>`; the variant tells the
/// orchestrator (and the caller) which kind of failure ended the run.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Candidate text could not be turned into a valid structured record.
    #[error("CV parsing failed: {0}")]
    Parsing(String),

    /// Posting text could not be turned into a valid structured record.
    #[error("Job normalization failed: {0}")]
    Normalization(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Similarity scoring failed: {0}")]
    Similarity(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Business-rule violations found by the rule validator. Always fatal.
    #[error("Optimized CV failed validation: {}", violations.join("; "))]
    RuleViolation { violations: Vec<String> },

    #[error("[{agent}] {message}")]
    AgentExecution { agent: String, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn agent(agent: &str, message: impl Into<String>) -> Self {
        AppError::AgentExecution {
            agent: agent.to_string(),
            message: message.into(),
        }
    }

    /// Stable machine-readable code surfaced to callers.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Parsing(_) => "PARSING_ERROR",
            AppError::Normalization(_) => "NORMALIZATION_ERROR",
            AppError::Embedding(_) => "EMBEDDING_ERROR",
            AppError::Similarity(_) => "SIMILARITY_ERROR",
            AppError::Generation(_) => "GENERATION_ERROR",
            AppError::RuleViolation { .. } => "VALIDATION_ERROR",
            AppError::AgentExecution { .. } => "AGENT_EXECUTION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Generation(_) | AppError::Embedding(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            AppError::RuleViolation { violations } => {
                tracing::warn!("Rule validation failed: {violations:?}");
                json!({
                    "error": {
                        "code": code,
                        "message": "Optimized CV failed validation",
                        "violations": violations,
                    }
                })
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                json!({
                    "error": {
                        "code": code,
                        "message": "An internal server error occurred",
                    }
                })
            }
            other => {
                if status.is_server_error() {
                    tracing::error!("{code}: {other}");
                } else {
                    tracing::warn!("{code}: {other}");
                }
                json!({
                    "error": {
                        "code": code,
                        "message": other.to_string(),
                    }
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_cover_error_taxonomy() {
        assert_eq!(AppError::Parsing("x".into()).code(), "PARSING_ERROR");
        assert_eq!(
            AppError::Normalization("x".into()).code(),
            "NORMALIZATION_ERROR"
        );
        assert_eq!(
            AppError::Embedding(EmbeddingError::EmptyInput).code(),
            "EMBEDDING_ERROR"
        );
        assert_eq!(AppError::Similarity("x".into()).code(), "SIMILARITY_ERROR");
        assert_eq!(
            AppError::Generation(GenerationError::EmptyContent).code(),
            "GENERATION_ERROR"
        );
        assert_eq!(
            AppError::RuleViolation { violations: vec![] }.code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(AppError::agent("rewriter", "boom").code(), "AGENT_EXECUTION_ERROR");
    }

    #[test]
    fn test_agent_error_carries_component_name() {
        let err = AppError::agent("match_analyzer", "failed after 3 attempts");
        assert_eq!(err.to_string(), "[match_analyzer] failed after 3 attempts");
    }

    #[test]
    fn test_rule_violation_is_unprocessable() {
        let response = AppError::RuleViolation {
            violations: vec!["Contact email is missing.".into()],
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_bad_request_status() {
        let response = AppError::BadRequest("cv_text too short".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
