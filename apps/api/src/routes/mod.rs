pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::optimization::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Full run
        .route("/api/v1/optimize", post(handlers::handle_optimize))
        // Staged pipeline
        .route("/api/v1/pipeline/parse-cv", post(handlers::handle_parse_cv))
        .route(
            "/api/v1/pipeline/normalize-job",
            post(handlers::handle_normalize_job),
        )
        .route("/api/v1/pipeline/match", post(handlers::handle_match))
        .route("/api/v1/pipeline/explain", post(handlers::handle_explain))
        .route("/api/v1/pipeline/rewrite", post(handlers::handle_rewrite))
        .route("/api/v1/pipeline/validate", post(handlers::handle_validate))
        .route("/api/v1/pipeline/compare", post(handlers::handle_compare))
        .with_state(state)
}
