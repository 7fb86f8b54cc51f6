//! Default LLM config for the review model, loaded from environment variables.
//!
//! # Environment variables
//!
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (default `http://localhost:11434`)
//! - `OLLAMA_MODEL`                = review model (default `gemma3n:latest`)
//! - `OLLAMA_TIMEOUT_SECS`         = optional client timeout (unset = no deadline)
//! - `LLM_MAX_TOKENS`              = optional max tokens (u32)
//! - `OLLAMA_TEMPERATURE`          = optional sampling temperature (f32)
//! - `OLLAMA_TOP_P`                = optional nucleus sampling cutoff (f32)

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{Result, non_empty, opt_number, validate_http_endpoint},
};

/// Ollama's default local endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model used when `OLLAMA_MODEL` is not set.
pub const DEFAULT_REVIEW_MODEL: &str = "gemma3n:latest";

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. [`DEFAULT_OLLAMA_URL`]
///
/// # Errors
///
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
/// - [`ConfigError::InvalidFormat`] if `OLLAMA_URL` has no http(s) scheme
fn ollama_endpoint<F>(lookup: &F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = non_empty(lookup, "OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url.trim_end_matches('/').to_string());
    }
    if let Some(port) = opt_number::<u16, _>(lookup, "OLLAMA_PORT", "expected u16 (1..=65535)")? {
        return Ok(format!("http://localhost:{port}"));
    }
    Ok(DEFAULT_OLLAMA_URL.to_string())
}

/// Constructs the review model config from the process environment.
pub fn config_ollama_review() -> Result<LlmModelConfig> {
    config_ollama_review_from(|name| std::env::var(name).ok())
}

/// Constructs the review model config from an arbitrary variable lookup.
///
/// # Defaults
/// - no sampling options unless set (the model's own defaults apply)
/// - no timeout
pub fn config_ollama_review_from<F>(lookup: F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let endpoint = ollama_endpoint(&lookup)?;
    let model = non_empty(&lookup, "OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_REVIEW_MODEL.into());

    Ok(LlmModelConfig {
        model,
        endpoint,
        max_tokens: opt_number(&lookup, "LLM_MAX_TOKENS", "expected u32")?,
        temperature: opt_number(&lookup, "OLLAMA_TEMPERATURE", "expected f32")?,
        top_p: opt_number(&lookup, "OLLAMA_TOP_P", "expected f32")?,
        timeout_secs: opt_number(&lookup, "OLLAMA_TIMEOUT_SECS", "expected u64 seconds")?,
    })
}
