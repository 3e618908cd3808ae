//! Runtime configuration loaded from environment variables.

use pattern_store::PatternFilter;
use serde_json::Value;

/// Number of patterns retrieved per query unless `RAG_TOP_K` says otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// Retrieval knobs for [`crate::Recommender`].
#[derive(Clone, Debug)]
pub struct RecommenderConfig {
    pub top_k: usize,
    /// Optional metadata filter applied to every retrieval.
    pub filter: Option<PatternFilter>,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            filter: None,
        }
    }
}

impl RecommenderConfig {
    /// Reads `RAG_TOP_K`, `RAG_FILTER_KEY` and `RAG_FILTER_VALUE`.
    ///
    /// Unparsable or zero `RAG_TOP_K` falls back to [`DEFAULT_TOP_K`].
    pub fn from_env() -> Self {
        let top_k = std::env::var("RAG_TOP_K")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|k| *k > 0)
            .unwrap_or(DEFAULT_TOP_K);

        let filter = filter_from(
            std::env::var("RAG_FILTER_KEY").ok(),
            std::env::var("RAG_FILTER_VALUE").ok(),
        );

        Self { top_k, filter }
    }
}

/// Builds a one-condition filter when both key and value are set.
///
/// The value is read as JSON first (`true`, `3`), falling back to a string.
pub fn filter_from(key: Option<String>, value: Option<String>) -> Option<PatternFilter> {
    let key = key.filter(|k| !k.trim().is_empty())?;
    let value = value?;
    Some(PatternFilter::eq(key, as_json(value)))
}

fn as_json(s: String) -> Value {
    serde_json::from_str::<Value>(&s).unwrap_or(Value::String(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_needs_key_and_value() {
        assert!(filter_from(None, Some("x".into())).is_none());
        assert!(filter_from(Some(" ".into()), Some("x".into())).is_none());
        assert!(filter_from(Some("free".into()), None).is_none());
    }

    #[test]
    fn filter_value_prefers_json() {
        let f = filter_from(Some("free".into()), Some("true".into())).unwrap();
        assert_eq!(f.equals, vec![("free".to_string(), Value::Bool(true))]);

        let f = filter_from(Some("yarn_weight".into()), Some("Bulky".into())).unwrap();
        assert_eq!(f.equals[0].1, Value::String("Bulky".into()));
    }
}
