//! Flat pattern record shared by ingestion, storage and recommendation.

use serde::{Deserialize, Serialize};

/// Placeholder used when the upstream payload has no designer or yarn weight.
pub const UNKNOWN: &str = "Unknown";

/// One knitting pattern, flattened from the Ravelry detail payload.
///
/// `id` is the natural key: re-ingesting a known id replaces the stored record.
/// `category` holds the sorted, space-separated set of category permalinks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub id: u64,
    pub name: String,
    pub designer: String,
    pub difficulty: f64,
    pub yarn_weight: String,
    pub notes: String,
    pub url: String,
    pub category: String,
    pub downloadable: bool,
    pub free: bool,
}
