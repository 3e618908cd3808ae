//! Loads the latest raw dump, embeds every pattern and upserts it into the index.

use anyhow::Context;
use knit_rag::{bootstrap, embedder, llm_profiles, pattern_store, raw_data_dir};
use pattern_store::{ingest_patterns, latest_dump, read_dump};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap()?;

    let dump = latest_dump(raw_data_dir()).context("locating raw dump")?;
    let records = read_dump(&dump).with_context(|| format!("reading {}", dump.display()))?;
    info!("Adding {} patterns to the vector store", records.len());

    let svc = llm_profiles()?;
    let (store_cfg, store) = pattern_store()?;
    let provider = embedder(svc, &store_cfg);

    let n = ingest_patterns(&store, &provider, &records)
        .await
        .context("ingesting patterns")?;
    let total = store.count().await.context("counting stored patterns")?;

    println!("Ingested {n} patterns from {} ({total} in index)", dump.display());
    Ok(())
}
