//! Vector index configuration.

use std::path::PathBuf;

use crate::errors::StoreError;

/// Collection holding the knitting patterns.
pub const DEFAULT_COLLECTION: &str = "knitting_patterns";
/// Directory of the local index file.
pub const DEFAULT_PERSIST_DIR: &str = "./data/processed";

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine similarity (recommended for sentence embeddings).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

/// Where vectors live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// JSON file under `persist_dir`, searched by brute force.
    Local,
    /// Qdrant server.
    Qdrant,
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for the pattern index.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: Backend,
    /// Directory for the local index file.
    pub persist_dir: PathBuf,
    /// Qdrant endpoint, e.g. `http://localhost:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Upsert batch size.
    pub upsert_batch: usize,
    /// Expected embedding size; `None` accepts the first vector's size.
    pub embedding_dim: Option<usize>,
}

impl StoreConfig {
    /// Local index under `persist_dir` with defaults for everything else.
    pub fn local(persist_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Local,
            persist_dir: persist_dir.into(),
            qdrant_url: "http://localhost:6334".into(),
            qdrant_api_key: None,
            collection: DEFAULT_COLLECTION.into(),
            distance: DistanceKind::Cosine,
            upsert_batch: 256,
            embedding_dim: None,
        }
    }

    /// Qdrant-backed index with defaults for everything else.
    pub fn qdrant(url: impl Into<String>) -> Self {
        Self {
            backend: Backend::Qdrant,
            qdrant_url: url.into(),
            ..Self::local(DEFAULT_PERSIST_DIR)
        }
    }

    /// Reads `VECTOR_BACKEND`, `VECTOR_PERSIST_DIR`, `QDRANT_URL`,
    /// `QDRANT_API_KEY`, `QDRANT_BATCH_SIZE` and `EMBEDDING_DIM`.
    pub fn from_env() -> Result<Self, StoreError> {
        let backend = match env("VECTOR_BACKEND", "local").to_ascii_lowercase().as_str() {
            "local" => Backend::Local,
            "qdrant" => Backend::Qdrant,
            other => {
                return Err(StoreError::Config(format!(
                    "VECTOR_BACKEND must be `local` or `qdrant`, got `{other}`"
                )));
            }
        };

        let mut cfg = Self::local(env("VECTOR_PERSIST_DIR", DEFAULT_PERSIST_DIR));
        cfg.backend = backend;
        cfg.qdrant_url = env("QDRANT_URL", "http://localhost:6334");
        cfg.qdrant_api_key = std::env::var("QDRANT_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        cfg.upsert_batch = parse("QDRANT_BATCH_SIZE", 256usize)?;
        cfg.embedding_dim = match std::env::var("EMBEDDING_DIM") {
            Ok(v) if !v.trim().is_empty() => Some(parse("EMBEDDING_DIM", 0usize)?),
            _ => None,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.collection.trim().is_empty() {
            return Err(StoreError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(StoreError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(StoreError::Config("embedding_dim must be > 0".into()));
        }
        if self.backend == Backend::Qdrant && self.qdrant_url.trim().is_empty() {
            return Err(StoreError::Config("qdrant_url is empty".into()));
        }
        Ok(())
    }

    /// Path of the local index file.
    pub fn index_path(&self) -> PathBuf {
        self.persist_dir.join(format!("{}.json", self.collection))
    }
}

fn env(k: &str, dflt: &str) -> String {
    match std::env::var(k) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => dflt.to_string(),
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> Result<T, StoreError> {
    match std::env::var(k) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse()
            .map_err(|_| StoreError::Config(format!("{k} is not a valid number: `{v}`"))),
        _ => Ok(dflt),
    }
}
