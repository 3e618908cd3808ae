//! Stored point shape, search hits and metadata filters.

use serde_json::{Map, Value};

use crate::errors::StoreError;
use ravelry_client::PatternRecord;

/// Payload key holding the short document text.
pub const DOCUMENT_KEY: &str = "document";

/// One entry of the vector index.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredPoint {
    pub id: u64,
    pub vector: Vec<f32>,
    pub document: String,
    pub metadata: Map<String, Value>,
}

impl StoredPoint {
    /// Builds the point for `record` with its embedding.
    pub fn from_record(record: &PatternRecord, vector: Vec<f32>) -> Self {
        Self {
            id: record.id,
            vector,
            document: document_text(record),
            metadata: pattern_metadata(record),
        }
    }

    /// Metadata plus the document under [`DOCUMENT_KEY`].
    pub fn payload(&self) -> Map<String, Value> {
        let mut payload = self.metadata.clone();
        payload.insert(DOCUMENT_KEY.into(), Value::String(self.document.clone()));
        payload
    }
}

/// Short searchable text stored next to the vector.
pub fn document_text(r: &PatternRecord) -> String {
    format!("{} by {} - {}", r.name, r.designer, r.category)
}

/// Every record field, keyed by its name, for filtering and reconstruction.
pub fn pattern_metadata(r: &PatternRecord) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("id".into(), Value::from(r.id));
    m.insert("name".into(), Value::from(r.name.clone()));
    m.insert("designer".into(), Value::from(r.designer.clone()));
    m.insert("category".into(), Value::from(r.category.clone()));
    m.insert("yarn_weight".into(), Value::from(r.yarn_weight.clone()));
    m.insert("difficulty".into(), Value::from(r.difficulty));
    m.insert("notes".into(), Value::from(r.notes.clone()));
    m.insert("url".into(), Value::from(r.url.clone()));
    m.insert("downloadable".into(), Value::from(r.downloadable));
    m.insert("free".into(), Value::from(r.free));
    m
}

/// A single retrieval hit.
#[derive(Clone, Debug)]
pub struct PatternHit {
    pub id: u64,
    pub score: f32,
    pub document: String,
    pub pattern: PatternRecord,
}

impl PatternHit {
    /// Rebuilds a hit from a stored payload.
    ///
    /// # Errors
    /// [`StoreError::Payload`] when the payload misses record fields.
    pub fn from_payload(score: f32, payload: Value) -> Result<Self, StoreError> {
        let document = payload
            .get(DOCUMENT_KEY)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let pattern: PatternRecord =
            serde_json::from_value(payload).map_err(|e| StoreError::Payload(e.to_string()))?;
        Ok(Self {
            id: pattern.id,
            score,
            document,
            pattern,
        })
    }
}

/// Exact-match metadata filter; every condition must hold.
#[derive(Clone, Debug, Default)]
pub struct PatternFilter {
    pub equals: Vec<(String, Value)>,
}

impl PatternFilter {
    /// Filter with one `field == value` condition.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            equals: vec![(field.into(), value.into())],
        }
    }

    /// Adds a `field == value` condition.
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.equals.push((field.into(), value.into()));
        self
    }

    /// True when every condition matches `metadata`.
    ///
    /// Numbers compare by value, so `3` matches a stored `3.0`.
    pub fn matches(&self, metadata: &Map<String, Value>) -> bool {
        self.equals
            .iter()
            .all(|(field, want)| metadata.get(field).is_some_and(|got| same_value(got, want)))
    }
}

fn same_value(got: &Value, want: &Value) -> bool {
    match (got, want) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => got == want,
    }
}
