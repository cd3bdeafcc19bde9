// Résumé ↔ job optimization pipeline.
// parse CV → normalize job → score → explain → rewrite → validate → rescore
// → narrative → report. All generative calls go through llm_client.

pub mod blend;
pub mod cv_parser;
pub mod explainer;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod handlers;
pub mod job_normalizer;
pub mod match_analyzer;
pub mod matcher;
pub mod narrative;
pub mod pipeline;
pub mod prompts;
pub mod rescorer;
pub mod retry;
pub mod rewriter;
pub mod validator;

use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Deserializes cleaned model output, mapping failures through `wrap`.
pub(crate) fn parse_model_json<T: DeserializeOwned>(
    text: &str,
    wrap: impl Fn(String) -> AppError,
) -> Result<T, AppError> {
    serde_json::from_str(text).map_err(|e| wrap(format!("LLM returned invalid JSON: {e}")))
}

/// Truncates to at most `max` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
