//! Ingestion pipeline: records → embeddings → batched upserts.

use indicatif::{ProgressBar, ProgressStyle};
use ravelry_client::PatternRecord;
use tracing::{debug, info};

use crate::PatternStore;
use crate::embed::{EmbeddingsProvider, embed_patterns};
use crate::errors::StoreError;

/// Embeds `records` and upserts them in batches of `upsert_batch`.
///
/// Returns the number of upserted points. Re-ingesting known ids replaces them.
pub async fn ingest_patterns(
    store: &PatternStore,
    provider: &dyn EmbeddingsProvider,
    records: &[PatternRecord],
) -> Result<usize, StoreError> {
    if records.is_empty() {
        info!("Nothing to ingest");
        return Ok(0);
    }

    let vectors = embed_patterns(records, provider).await?;

    let batch_size = store.config().upsert_batch.max(1);
    let total_chunks = records.len().div_ceil(batch_size);
    let pb = ProgressBar::new(total_chunks as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-"),
    );

    let mut total = 0usize;
    for (recs, vecs) in records.chunks(batch_size).zip(vectors.chunks(batch_size)) {
        total += store.upsert(recs, vecs).await?;
        debug!(total, "batch upserted");
        pb.inc(1);
    }

    pb.finish_with_message("Ingestion complete");
    info!("Ingested {} patterns", total);
    Ok(total)
}
