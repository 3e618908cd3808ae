//! Shared LLM service with two profiles: `generation` and `embedding`.
//!
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - If both profiles resolve to the same config, a single HTTP client is shared.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//! use ai_llm_service::config::default_config::{config_ollama_embedding, config_ollama_generation};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(
//!     config_ollama_generation()?,
//!     config_ollama_embedding()?,
//! )?);
//!
//! let txt = svc.generate("Suggest a beginner hat pattern.").await?;
//! let emb = svc.embed("chunky cardigan for fall").await?;
//! println!("{txt}\nEmbedding dim = {}", emb.len());
//! # Ok(()) }
//! ```

use std::sync::Arc;

use tracing::info;

use crate::{
    config::llm_model_config::LlmModelConfig, error_handler::AiLlmError,
    services::ollama_service::OllamaService,
};

/// Shared service managing the **generation** and **embedding** profiles.
#[derive(Debug)]
pub struct LlmServiceProfiles {
    generation: Arc<OllamaService>,
    embedding: Arc<OllamaService>,
}

impl LlmServiceProfiles {
    /// Creates the service and its HTTP clients.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if a config is invalid or a client cannot be built.
    pub fn new(generation: LlmModelConfig, embedding: LlmModelConfig) -> Result<Self, AiLlmError> {
        generation.validate()?;
        embedding.validate()?;

        let same = generation == embedding;
        let generation = Arc::new(OllamaService::new(generation)?);
        let embedding = if same {
            Arc::clone(&generation)
        } else {
            Arc::new(OllamaService::new(embedding)?)
        };

        info!(
            generation_model = generation.model(),
            embedding_model = embedding.model(),
            "LLM profiles ready"
        );

        Ok(Self {
            generation,
            embedding,
        })
    }

    /// Generates text using the **generation** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails.
    pub async fn generate(&self, prompt: &str) -> Result<String, AiLlmError> {
        Ok(self.generation.generate(prompt).await?)
    }

    /// Computes one embedding using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        Ok(self.embedding.embeddings(input).await?)
    }

    /// Computes embeddings for a batch, one row per input in input order.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if embedding fails.
    pub async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AiLlmError> {
        Ok(self.embedding.embed_batch(inputs).await?)
    }

    /// Model names `(generation, embedding)`.
    pub fn models(&self) -> (&str, &str) {
        (self.generation.model(), self.embedding.model())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            model: model.into(),
            endpoint: "http://localhost:11434".into(),
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(30),
        }
    }

    #[test]
    fn identical_profiles_share_one_client() {
        let svc = LlmServiceProfiles::new(cfg("all-minilm"), cfg("all-minilm")).unwrap();
        assert!(Arc::ptr_eq(&svc.generation, &svc.embedding));
    }

    #[test]
    fn distinct_profiles_keep_their_models() {
        let svc = LlmServiceProfiles::new(cfg("mistral:7b"), cfg("all-minilm")).unwrap();
        assert_eq!(svc.models(), ("mistral:7b", "all-minilm"));
    }
}
