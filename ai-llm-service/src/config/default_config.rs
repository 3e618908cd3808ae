//! Default Ollama configs loaded from environment variables.
//!
//! Two roles are used by the recommender:
//!
//! - **Generation** → the model that writes recommendations
//! - **Embedding**  → the model that vectorizes patterns and queries
//!
//! Ingestion and query paths must share the same embedding config, otherwise
//! query vectors land in a different space than the stored ones.
//!
//! # Environment variables
//!
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (default `http://localhost:11434`)
//! - `OLLAMA_MODEL`                = generation model (default `mistral:7b`)
//! - `EMBEDDING_MODEL`             = embedding model (default `all-minilm`)
//! - `LLM_MAX_TOKENS`              = optional max tokens (u32)

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{ConfigError, Result, env_opt_u32, env_or},
};

/// Default local Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default generation model.
pub const DEFAULT_GENERATION_MODEL: &str = "mistral:7b";
/// Default embedding model (MiniLM-L6, 384 dimensions).
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

/// Resolves the Ollama endpoint from optional `OLLAMA_URL` / `OLLAMA_PORT` values.
///
/// Precedence:
/// 1. `url` if present and non-empty
/// 2. `port` → `http://localhost:{port}`
/// 3. [`DEFAULT_OLLAMA_URL`]
///
/// # Errors
/// [`ConfigError::InvalidNumber`] if the port is not a valid `u16`.
pub fn resolve_endpoint(url: Option<String>, port: Option<String>) -> Result<String> {
    if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
        return Ok(url.trim().to_string());
    }
    if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Ok(DEFAULT_OLLAMA_URL.to_string())
}

fn ollama_endpoint() -> Result<String> {
    resolve_endpoint(
        std::env::var("OLLAMA_URL").ok(),
        std::env::var("OLLAMA_PORT").ok(),
    )
}

/// Constructs the **generation** config.
///
/// # Defaults
/// - `temperature = Some(0.7)`
/// - `timeout_secs = Some(600)` (local models on CPU are slow)
pub fn config_ollama_generation() -> Result<LlmModelConfig> {
    let cfg = LlmModelConfig {
        model: env_or("OLLAMA_MODEL", DEFAULT_GENERATION_MODEL),
        endpoint: ollama_endpoint()?,
        max_tokens: env_opt_u32("LLM_MAX_TOKENS")?,
        temperature: Some(0.7),
        top_p: None,
        timeout_secs: Some(600),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Constructs the **embedding** config.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `timeout_secs = Some(120)`
pub fn config_ollama_embedding() -> Result<LlmModelConfig> {
    let cfg = LlmModelConfig {
        model: env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
        endpoint: ollama_endpoint()?,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(120),
    };
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handler::AiLlmError;

    #[test]
    fn url_wins_over_port() {
        let ep = resolve_endpoint(Some("http://gpu-box:11434".into()), Some("9999".into())).unwrap();
        assert_eq!(ep, "http://gpu-box:11434");
    }

    #[test]
    fn port_builds_localhost_url() {
        let ep = resolve_endpoint(Some("   ".into()), Some("11500".into())).unwrap();
        assert_eq!(ep, "http://localhost:11500");
    }

    #[test]
    fn falls_back_to_default() {
        assert_eq!(resolve_endpoint(None, None).unwrap(), DEFAULT_OLLAMA_URL);
    }

    #[test]
    fn bad_port_is_an_error() {
        let err = resolve_endpoint(None, Some("eleven".into())).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Config(ConfigError::InvalidNumber { var: "OLLAMA_PORT", .. })
        ));
    }
}
