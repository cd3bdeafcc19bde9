use std::str::FromStr;

use anyhow::{bail, Context, Result};

const DEFAULT_LLM_BASE_URL: &str = "https://integrate.api.nvidia.com/v1";
const DEFAULT_LLM_MODEL: &str = "deepseek-ai/deepseek-r1-distill-qwen-32b";
const DEFAULT_EMBEDDING_MODEL: &str = "baai/bge-m3";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    /// Score Blender embedding weight; the generative weight is `1 - this`.
    pub blend_embedding_weight: f64,
    /// Extra attempts per generative agent after the first one.
    pub agent_max_retries: u32,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// OpenAI-compatible `/embeddings` endpoint.
    Http,
    /// In-process hashing embedder, no network.
    Local,
}

#[derive(Debug, Clone)]
pub struct EmbeddingSettings {
    pub backend: EmbeddingBackend,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the process env in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let llm_api_key = require(&lookup, "LLM_API_KEY")?;
        let llm_base_url = lookup("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_LLM_BASE_URL.into());
        let timeout_secs = parse_or(&lookup, "LLM_TIMEOUT_SECS", 120u64)?;

        let llm = LlmSettings {
            api_key: llm_api_key.clone(),
            base_url: llm_base_url.clone(),
            model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
            temperature: parse_or(&lookup, "LLM_TEMPERATURE", 0.6)?,
            top_p: parse_or(&lookup, "LLM_TOP_P", 0.7)?,
            max_tokens: parse_or(&lookup, "LLM_MAX_TOKENS", 4096u32)?,
            timeout_secs,
        };

        let backend = match lookup("EMBEDDING_PROVIDER")
            .unwrap_or_else(|| "http".into())
            .to_lowercase()
            .as_str()
        {
            "http" => EmbeddingBackend::Http,
            "local" => EmbeddingBackend::Local,
            other => bail!("EMBEDDING_PROVIDER must be 'http' or 'local', got '{other}'"),
        };

        let embedding = EmbeddingSettings {
            backend,
            base_url: lookup("EMBEDDING_BASE_URL").unwrap_or(llm_base_url),
            api_key: lookup("EMBEDDING_API_KEY").unwrap_or(llm_api_key),
            model: lookup("EMBEDDING_MODEL").unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into()),
            dimensions: parse_or(&lookup, "EMBEDDING_DIMENSIONS", 384usize)?,
            timeout_secs,
        };

        let blend_embedding_weight = parse_or(&lookup, "BLEND_EMBEDDING_WEIGHT", 0.35)?;
        if !(0.0..=1.0).contains(&blend_embedding_weight) {
            bail!("BLEND_EMBEDDING_WEIGHT must be within [0, 1], got {blend_embedding_weight}");
        }

        Ok(Config {
            llm,
            embedding,
            blend_embedding_weight,
            agent_max_retries: parse_or(&lookup, "AGENT_MAX_RETRIES", 2u32)?,
            port: parse_or(&lookup, "PORT", 8080u16)
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}
