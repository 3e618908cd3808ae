//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for pattern-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O or filesystem errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch in vector dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Embedding model returned a different number of rows than inputs.
    #[error("embedding count mismatch: got {got}, want {want}")]
    EmbeddingCount { got: usize, want: usize },

    /// Records and vectors passed to an upsert differ in length.
    #[error("{records} records but {vectors} vectors")]
    LengthMismatch { records: usize, vectors: usize },

    /// Embedding provider failure.
    #[error("embedding error: {0}")]
    Embedding(#[from] ai_llm_service::AiLlmError),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// Stored payload could not be turned back into a pattern.
    #[error("bad payload: {0}")]
    Payload(String),

    /// No numbered dump file in the raw-data directory.
    #[error("no pattern dump found in {0}")]
    NoDump(String),
}
