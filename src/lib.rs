//! Shared start-up wiring for the `download_data`, `ingest` and `recommend`
//! binaries.

pub mod telemetry;

use std::path::PathBuf;
use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use ai_llm_service::config::default_config::{config_ollama_embedding, config_ollama_generation};
use anyhow::Context;
use pattern_store::{OllamaEmbedder, PatternStore, StoreConfig};
use tracing::{debug, info};

/// Raw dump directory unless `RAW_DATA_DIR` is set.
pub const DEFAULT_RAW_DATA_DIR: &str = "./data/raw";

/// Query used by `recommend` when `KNIT_QUERY` is unset.
pub const DEFAULT_QUERY: &str = "i want to knit a chunky cardigan";

/// Loads `.env` (a missing file is fine) and installs tracing.
pub fn bootstrap() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    telemetry::init_tracing().context("installing tracing subscriber")?;
    match dotenv {
        Ok(path) => debug!("loaded environment from {:?}", path),
        Err(e) if e.not_found() => debug!("no .env file, using process environment"),
        Err(e) => return Err(e).context("reading .env"),
    }
    Ok(())
}

/// `RAW_DATA_DIR` or [`DEFAULT_RAW_DATA_DIR`].
pub fn raw_data_dir() -> PathBuf {
    non_empty_var("RAW_DATA_DIR")
        .unwrap_or_else(|| DEFAULT_RAW_DATA_DIR.into())
        .into()
}

/// `KNIT_QUERY` or [`DEFAULT_QUERY`].
pub fn query_from_env() -> String {
    non_empty_var("KNIT_QUERY").unwrap_or_else(|| DEFAULT_QUERY.into())
}

/// Generation and embedding profiles built from `OLLAMA_*` / `EMBEDDING_MODEL`.
pub fn llm_profiles() -> anyhow::Result<Arc<LlmServiceProfiles>> {
    let generation = config_ollama_generation().context("generation model config")?;
    let embedding = config_ollama_embedding().context("embedding model config")?;
    let svc = LlmServiceProfiles::new(generation, embedding).context("creating Ollama clients")?;
    Ok(Arc::new(svc))
}

/// Store config from the environment plus the opened store.
pub fn pattern_store() -> anyhow::Result<(StoreConfig, Arc<PatternStore>)> {
    let cfg = StoreConfig::from_env().context("vector store config")?;
    info!(
        backend = ?cfg.backend,
        collection = %cfg.collection,
        "opening pattern store"
    );
    let store = PatternStore::new(cfg.clone()).context("opening pattern store")?;
    Ok((cfg, Arc::new(store)))
}

/// The embedder shared by ingestion and retrieval.
pub fn embedder(svc: Arc<LlmServiceProfiles>, cfg: &StoreConfig) -> OllamaEmbedder {
    OllamaEmbedder::new(svc, cfg.embedding_dim)
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
