//! Typed error for the recommender crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommenderError {
    /// Embedding or vector index failures.
    #[error("store error: {0}")]
    Store(#[from] pattern_store::StoreError),

    /// Text generation failures.
    #[error("LLM error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),
}
