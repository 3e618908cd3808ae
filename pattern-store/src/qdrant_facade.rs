//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! All Qdrant interactions live behind this facade so the rest of the crate
//! only deals with [`StoredPoint`]s and JSON payloads.

use std::collections::HashMap;

use crate::config::{DistanceKind, StoreConfig, VectorSpace};
use crate::errors::StoreError;
use crate::record::StoredPoint;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, ListValue, PointId, PointStruct,
    SearchPointsBuilder, Struct, UpsertPointsBuilder, Value as QValue, VectorParamsBuilder,
    value::Kind,
};
use tracing::{debug, info, warn};

/// A facade over the Qdrant client.
pub struct QdrantFacade {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    pub fn new(cfg: &StoreConfig) -> Result<Self, StoreError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.collection.clone(),
            distance: cfg.distance,
        })
    }

    /// Ensures that the collection exists; creates it for `space` if missing.
    pub async fn ensure_collection(&self, space: &VectorSpace) -> Result<(), StoreError> {
        let exists = self
            .client
            .collection_exists(self.collection.as_str())
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;
        if exists {
            debug!("Collection '{}' already exists", self.collection);
            return Ok(());
        }

        warn!(
            "Collection '{}' not found, creating with size={} distance={:?}",
            self.collection, space.size, space.distance
        );

        let distance = match space.distance {
            DistanceKind::Cosine => Distance::Cosine,
            DistanceKind::Dot => Distance::Dot,
            DistanceKind::Euclid => Distance::Euclid,
        };

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, distance)),
            )
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;

        info!("Collection '{}' created", self.collection);
        Ok(())
    }

    /// Upserts points; an existing point with the same id is replaced.
    pub async fn upsert_points(&self, points: &[StoredPoint]) -> Result<usize, StoreError> {
        let Some(first) = points.first() else {
            debug!("No points provided for upsert");
            return Ok(0);
        };

        self.ensure_collection(&VectorSpace {
            size: first.vector.len(),
            distance: self.distance,
        })
        .await?;

        let qpoints: Vec<PointStruct> = points.iter().map(to_point_struct).collect();
        info!(
            "Upserting {} points into collection '{}'",
            qpoints.len(),
            self.collection
        );

        let res = self
            .client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, qpoints).wait(true))
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;
        debug!("Upsert operation result={:?}", res.result);

        Ok(points.len())
    }

    /// Similarity search; returns `(score, payload)` sorted by score.
    pub async fn search(
        &self,
        vector: Vec<f32>,
        top_k: u64,
        filter: Option<Filter>,
    ) -> Result<Vec<(f32, serde_json::Value)>, StoreError> {
        debug!(
            "Searching '{}' top_k={} filtered={}",
            self.collection,
            top_k,
            filter.is_some()
        );

        let mut builder =
            SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true);
        if let Some(f) = filter {
            builder = builder.filter(f);
        }

        let res = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;

        let out: Vec<(f32, serde_json::Value)> = res
            .result
            .into_iter()
            .map(|p| (p.score, qpayload_to_json(p.payload)))
            .collect();

        debug!("Search completed: {} hits returned", out.len());
        Ok(out)
    }

    /// Exact number of points in the collection (0 if it does not exist yet).
    pub async fn count(&self) -> Result<u64, StoreError> {
        let exists = self
            .client
            .collection_exists(self.collection.as_str())
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;
        if !exists {
            return Ok(0);
        }
        let res = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(|e| StoreError::Qdrant(e.to_string()))?;
        Ok(res.result.map(|r| r.count).unwrap_or(0))
    }
}

fn to_point_struct(p: &StoredPoint) -> PointStruct {
    let payload: HashMap<String, QValue> = p
        .payload()
        .into_iter()
        .map(|(k, v)| (k, json_to_qvalue(v)))
        .collect();

    PointStruct {
        id: Some(PointId::from(p.id)),
        payload,
        vectors: Some(p.vector.clone().into()),
        ..Default::default()
    }
}

/// Converts `serde_json::Value` into Qdrant `Value` (handles arrays/objects).
fn json_to_qvalue(v: serde_json::Value) -> QValue {
    let kind = match v {
        serde_json::Value::String(s) => Some(Kind::StringValue(s)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Kind::IntegerValue(i)),
            None => n.as_f64().map(Kind::DoubleValue),
        },
        serde_json::Value::Bool(b) => Some(Kind::BoolValue(b)),
        serde_json::Value::Array(arr) => Some(Kind::ListValue(ListValue {
            values: arr.into_iter().map(json_to_qvalue).collect(),
        })),
        serde_json::Value::Object(map) => Some(Kind::StructValue(Struct {
            fields: map.into_iter().map(|(k, v)| (k, json_to_qvalue(v))).collect(),
        })),
        serde_json::Value::Null => None,
    };
    QValue { kind }
}

/// Converts a Qdrant payload into a JSON object.
fn qpayload_to_json(p: HashMap<String, QValue>) -> serde_json::Value {
    serde_json::Value::Object(p.into_iter().map(|(k, v)| (k, qvalue_to_json(v))).collect())
}

fn qvalue_to_json(v: QValue) -> serde_json::Value {
    match v.kind {
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(f)) => serde_json::Value::from(f),
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::ListValue(l)) => {
            serde_json::Value::Array(l.values.into_iter().map(qvalue_to_json).collect())
        }
        Some(Kind::StructValue(s)) => qpayload_to_json(s.fields),
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_values_survive_conversion() {
        let original = json!({
            "id": 12345,
            "difficulty": 0.0,
            "free": true,
            "category": "cardigan dk-cardigan",
            "tags": ["a", 1],
            "nested": { "x": null }
        });
        let q: HashMap<String, QValue> = original
            .as_object()
            .unwrap()
            .clone()
            .into_iter()
            .map(|(k, v)| (k, json_to_qvalue(v)))
            .collect();

        assert!(matches!(q["difficulty"].kind, Some(Kind::DoubleValue(_))));
        assert!(matches!(q["id"].kind, Some(Kind::IntegerValue(12345))));
        assert_eq!(qpayload_to_json(q), original);
    }

    #[test]
    fn point_uses_numeric_pattern_id() {
        let p = StoredPoint {
            id: 77,
            vector: vec![0.5, 0.5],
            document: "doc".into(),
            metadata: serde_json::Map::new(),
        };
        let qp = to_point_struct(&p);
        assert_eq!(qp.id, Some(PointId::from(77u64)));
        assert!(qp.payload.contains_key("document"));
    }
}
