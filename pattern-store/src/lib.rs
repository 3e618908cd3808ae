//! Vector storage for knitting patterns.
//!
//! This crate provides:
//! - the embedding stage ([`embed_patterns`], [`EmbeddingsProvider`])
//! - a [`PatternStore`] over Qdrant or a local JSON index
//! - numbered raw-data dumps ([`write_dump`], [`latest_dump`])
//! - the ingestion pipeline ([`ingest_patterns`])

mod config;
mod dump;
mod embed;
mod errors;
mod filters;
mod ingest;
mod local_index;
mod qdrant_facade;
mod record;

pub use config::{
    Backend, DEFAULT_COLLECTION, DEFAULT_PERSIST_DIR, DistanceKind, StoreConfig, VectorSpace,
};
pub use dump::{DUMP_BASE, latest_dump, next_dump_path, read_dump, write_dump};
pub use embed::ollama::OllamaEmbedder;
pub use embed::{EmbeddingsProvider, embed_patterns, pattern_text};
pub use errors::StoreError;
pub use ingest::ingest_patterns;
pub use record::{DOCUMENT_KEY, PatternFilter, PatternHit, StoredPoint, document_text};

use ravelry_client::PatternRecord;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use crate::local_index::LocalIndex;
use crate::qdrant_facade::QdrantFacade;

enum Index {
    Qdrant(QdrantFacade),
    Local(RwLock<LocalIndex>),
}

/// Pattern index facade; the backend is chosen by [`StoreConfig::backend`].
pub struct PatternStore {
    cfg: StoreConfig,
    index: Index,
}

impl PatternStore {
    /// Opens the configured backend.
    ///
    /// # Errors
    /// `StoreError::Config` for invalid settings, I/O or parse errors when the
    /// local index file is unreadable.
    pub fn new(cfg: StoreConfig) -> Result<Self, StoreError> {
        cfg.validate()?;
        trace!("PatternStore::new backend={:?} collection={}", cfg.backend, cfg.collection);
        let index = match cfg.backend {
            Backend::Qdrant => Index::Qdrant(QdrantFacade::new(&cfg)?),
            Backend::Local => Index::Local(RwLock::new(LocalIndex::open(
                cfg.index_path(),
                &cfg.collection,
                cfg.distance,
            )?)),
        };
        Ok(Self { cfg, index })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    /// Stores `records[i]` with `vectors[i]`, replacing entries with equal ids.
    ///
    /// # Errors
    /// - [`StoreError::LengthMismatch`] when the slices differ in length
    /// - [`StoreError::VectorSizeMismatch`] against `embedding_dim` or the index
    pub async fn upsert(
        &self,
        records: &[PatternRecord],
        vectors: &[Vec<f32>],
    ) -> Result<usize, StoreError> {
        if records.len() != vectors.len() {
            return Err(StoreError::LengthMismatch {
                records: records.len(),
                vectors: vectors.len(),
            });
        }
        let points: Vec<StoredPoint> = records
            .iter()
            .zip(vectors)
            .map(|(r, v)| StoredPoint::from_record(r, v.clone()))
            .collect();
        self.upsert_points(&points).await
    }

    /// Stores one entry with an explicit document and metadata.
    ///
    /// # Errors
    /// [`StoreError::Payload`] when `metadata` does not describe a full pattern
    /// with the same `id`; nothing is written in that case.
    pub async fn upsert_one(
        &self,
        id: u64,
        vector: Vec<f32>,
        document: String,
        metadata: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let point = StoredPoint {
            id,
            vector,
            document,
            metadata,
        };
        let hit = PatternHit::from_payload(0.0, Value::Object(point.payload()))?;
        if hit.id != id {
            return Err(StoreError::Payload(format!(
                "metadata id {} does not match point id {id}",
                hit.id
            )));
        }
        self.upsert_points(&[point]).await.map(|_| ())
    }

    async fn upsert_points(&self, points: &[StoredPoint]) -> Result<usize, StoreError> {
        if let Some(want) = self.cfg.embedding_dim {
            if let Some(bad) = points.iter().find(|p| p.vector.len() != want) {
                return Err(StoreError::VectorSizeMismatch {
                    got: bad.vector.len(),
                    want,
                });
            }
        }

        let mut total = 0;
        for chunk in points.chunks(self.cfg.upsert_batch.max(1)) {
            total += match &self.index {
                Index::Qdrant(q) => q.upsert_points(chunk).await?,
                Index::Local(l) => l.write().await.upsert(chunk)?,
            };
        }
        Ok(total)
    }

    /// At most `top_k` hits, best first, each carrying the full pattern.
    ///
    /// Stored entries whose payload no longer forms a pattern are skipped
    /// with a warning.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: usize,
        filter: Option<&PatternFilter>,
    ) -> Result<Vec<PatternHit>, StoreError> {
        let raw = match &self.index {
            Index::Qdrant(q) => {
                let qfilter = filter.map(filters::to_qdrant_filter);
                q.search(vector, top_k as u64, qfilter).await?
            }
            Index::Local(l) => l.read().await.search(&vector, top_k, filter)?,
        };
        debug!("PatternStore::search -> {} hits", raw.len());

        Ok(raw
            .into_iter()
            .filter_map(|(score, payload)| match PatternHit::from_payload(score, payload) {
                Ok(hit) => Some(hit),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable stored payload");
                    None
                }
            })
            .collect())
    }

    /// Number of stored entries.
    pub async fn count(&self) -> Result<u64, StoreError> {
        match &self.index {
            Index::Qdrant(q) => q.count().await,
            Index::Local(l) => Ok(l.read().await.len() as u64),
        }
    }
}
