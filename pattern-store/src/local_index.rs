//! File-backed vector index searched by brute force.
//!
//! The whole index is one JSON document at [`StoreConfig::index_path`]; it is
//! rewritten after every upsert (temp file + rename).
//!
//! [`StoreConfig::index_path`]: crate::config::StoreConfig::index_path

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, trace};

use crate::config::DistanceKind;
use crate::errors::StoreError;
use crate::record::{PatternFilter, StoredPoint};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct IndexEntry {
    vector: Vec<f32>,
    document: String,
    metadata: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    collection: String,
    dim: Option<usize>,
    entries: BTreeMap<u64, IndexEntry>,
}

/// In-memory view of the index file.
#[derive(Debug)]
pub struct LocalIndex {
    path: PathBuf,
    distance: DistanceKind,
    file: IndexFile,
}

impl LocalIndex {
    /// Loads the index at `path`, or starts an empty one when the file is absent.
    pub fn open(
        path: impl Into<PathBuf>,
        collection: &str,
        distance: DistanceKind,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let file = if path.exists() {
            let data = fs::read_to_string(&path)?;
            let file: IndexFile = serde_json::from_str(&data)?;
            info!(
                "Loaded local index {:?} ({} entries)",
                path,
                file.entries.len()
            );
            file
        } else {
            debug!("No local index at {:?}, starting empty", path);
            IndexFile {
                collection: collection.to_string(),
                ..Default::default()
            }
        };
        Ok(Self {
            path,
            distance,
            file,
        })
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.file.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.entries.is_empty()
    }

    /// Inserts or replaces points by id, then persists the file.
    ///
    /// The in-memory view only changes once the file is written.
    ///
    /// # Errors
    /// [`StoreError::VectorSizeMismatch`] when a vector does not match the
    /// index dimension (fixed by the first vector ever stored).
    pub fn upsert(&mut self, points: &[StoredPoint]) -> Result<usize, StoreError> {
        if points.is_empty() {
            return Ok(0);
        }
        let want = self.file.dim.unwrap_or(points[0].vector.len());
        if let Some(bad) = points.iter().find(|p| p.vector.len() != want) {
            return Err(StoreError::VectorSizeMismatch {
                got: bad.vector.len(),
                want,
            });
        }
        let mut next = self.file.clone();
        next.dim = Some(want);
        for p in points {
            next.entries.insert(
                p.id,
                IndexEntry {
                    vector: p.vector.clone(),
                    document: p.document.clone(),
                    metadata: p.metadata.clone(),
                },
            );
        }
        write_file(&self.path, &next)?;
        self.file = next;
        debug!(
            "Local upsert of {} points, index now holds {}",
            points.len(),
            self.len()
        );
        Ok(points.len())
    }

    /// Top `top_k` entries by similarity; returns `(score, payload)` pairs.
    pub fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&PatternFilter>,
    ) -> Result<Vec<(f32, Value)>, StoreError> {
        if let Some(want) = self.file.dim {
            if vector.len() != want {
                return Err(StoreError::VectorSizeMismatch {
                    got: vector.len(),
                    want,
                });
            }
        }

        let mut scored: Vec<(f32, u64)> = self
            .file
            .entries
            .iter()
            .filter(|(_, e)| filter.is_none_or(|f| f.matches(&e.metadata)))
            .map(|(id, e)| (score(self.distance, vector, &e.vector), *id))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.truncate(top_k);
        trace!("Local search scored {} candidates", scored.len());

        Ok(scored
            .into_iter()
            .filter_map(|(s, id)| self.file.entries.get(&id).map(|e| (s, payload(e))))
            .collect())
    }

}

fn write_file(path: &Path, file: &IndexFile) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, serde_json::to_vec(file)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn payload(e: &IndexEntry) -> Value {
    let mut m = e.metadata.clone();
    m.insert(
        crate::record::DOCUMENT_KEY.into(),
        Value::String(e.document.clone()),
    );
    Value::Object(m)
}

/// Higher is closer for every distance kind (Euclid is negated).
fn score(kind: DistanceKind, a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    match kind {
        DistanceKind::Dot => dot,
        DistanceKind::Cosine => {
            let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
            let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
            if na == 0.0 || nb == 0.0 {
                0.0
            } else {
                dot / (na * nb)
            }
        }
        DistanceKind::Euclid => -a
            .iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt(),
    }
}
