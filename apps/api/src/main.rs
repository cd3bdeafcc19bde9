mod config;
mod embedding;
mod errors;
mod llm_client;
mod models;
mod optimization;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingBackend};
use crate::embedding::{EmbeddingProvider, HashingEmbedder, HttpEmbeddingProvider};
use crate::llm_client::provider::OpenAiCompatibleProvider;
use crate::llm_client::LlmClient;
use crate::optimization::pipeline::Pipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resumeopt API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let provider = OpenAiCompatibleProvider::new(&config.llm)?;
    let llm = LlmClient::new(Arc::new(provider));
    info!("LLM client initialized (model: {})", llm.provider_name());

    // Embedding provider: built once, shared by every request
    let embedder = build_embedder(&config)?;
    info!(
        "Embedding provider initialized ({})",
        embedder.provider_name()
    );

    let pipeline = Pipeline::from_config(&config, llm, embedder);

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    let embedder: Arc<dyn EmbeddingProvider> = match config.embedding.backend {
        EmbeddingBackend::Http => Arc::new(HttpEmbeddingProvider::new(&config.embedding)?),
        EmbeddingBackend::Local => Arc::new(HashingEmbedder::new(config.embedding.dimensions)),
    };
    Ok(embedder)
}
