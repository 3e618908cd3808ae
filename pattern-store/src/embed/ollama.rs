//! Ollama embedding provider backed by the shared [`LlmServiceProfiles`].

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::LlmServiceProfiles;

use crate::embed::EmbeddingsProvider;
use crate::errors::StoreError;

/// Ollama embedding provider (async, batch).
#[derive(Clone)]
pub struct OllamaEmbedder {
    svc: Arc<LlmServiceProfiles>,
    /// Expected embedding size; `None` skips the check.
    dim: Option<usize>,
}

impl OllamaEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: Option<usize>) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingsProvider for OllamaEmbedder {
    fn embed_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let rows = self.svc.embed_batch(texts).await?;

            if let Some(want) = self.dim {
                if let Some(bad) = rows.iter().find(|r| r.len() != want) {
                    return Err(StoreError::VectorSizeMismatch {
                        got: bad.len(),
                        want,
                    });
                }
            }

            Ok(rows)
        })
    }
}
