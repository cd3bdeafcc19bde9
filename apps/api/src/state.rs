use std::sync::Arc;

use crate::config::Config;
use crate::optimization::pipeline::Pipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Every stage, wired once at startup around the shared gateway and embedder.
    pub pipeline: Arc<Pipeline>,
    pub config: Config,
}
