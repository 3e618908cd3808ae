//! Embedding stage: record → descriptive line → vector.
//!
//! The same [`EmbeddingsProvider`] must be used on the ingestion and the query
//! path so that stored vectors and query vectors share one space.

use std::{future::Future, pin::Pin};

use ravelry_client::PatternRecord;
use tracing::{debug, info};

use crate::errors::StoreError;

pub mod ollama;

/// Asynchronous embedding provider.
///
/// Implement this trait to plug in an embedding backend (Ollama in production,
/// deterministic fakes in tests).
pub trait EmbeddingsProvider: Send + Sync {
    /// Embeds a batch; must return one row per input, in input order.
    fn embed_batch<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, StoreError>> + Send + 'a>>;

    /// Embeds one text.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let input = vec![text.to_string()];
            let rows = self.embed_batch(&input).await?;
            let got = rows.len();
            rows.into_iter()
                .next()
                .ok_or(StoreError::EmbeddingCount { got, want: 1 })
        })
    }
}

/// One descriptive line per pattern, fields in fixed order joined by `" | "`.
///
/// The description part is only present when `notes` is non-empty.
pub fn pattern_text(p: &PatternRecord) -> String {
    let mut parts = vec![
        format!("id: {}", p.id),
        format!("Pattern: {}", p.name),
        format!("Designer: {}", p.designer),
        format!("Category: {}", p.category),
        format!("Yarn weight: {}", p.yarn_weight),
        format!("Difficulty: {:.1}/10", p.difficulty),
    ];
    if !p.notes.is_empty() {
        parts.push(format!("Description: {}", p.notes));
    }
    parts.join(" | ")
}

/// Embeds every record with one batch call.
///
/// Returns exactly `records.len()` vectors in input order, all of one size.
///
/// # Errors
/// - [`StoreError::EmbeddingCount`] if the provider returns a different row count
/// - [`StoreError::VectorSizeMismatch`] if rows differ in length
/// - provider errors unchanged
pub async fn embed_patterns(
    records: &[PatternRecord],
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<Vec<f32>>, StoreError> {
    if records.is_empty() {
        debug!("embed_patterns: nothing to embed");
        return Ok(Vec::new());
    }

    let texts: Vec<String> = records.iter().map(pattern_text).collect();
    info!("Creating embeddings for {} patterns", texts.len());
    let rows = provider.embed_batch(&texts).await?;

    if rows.len() != texts.len() {
        return Err(StoreError::EmbeddingCount {
            got: rows.len(),
            want: texts.len(),
        });
    }
    let dim = rows[0].len();
    if let Some(bad) = rows.iter().find(|r| r.len() != dim) {
        return Err(StoreError::VectorSizeMismatch {
            got: bad.len(),
            want: dim,
        });
    }

    debug!(rows = rows.len(), dim, "embeddings ready");
    Ok(rows)
}
