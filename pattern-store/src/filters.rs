//! Filter conversion to Qdrant `Filter`.
//!
//! Supports exact equality on scalar fields (`String`, `Number`, `Bool`).

use crate::record::PatternFilter;
use qdrant_client::qdrant::{
    Condition, FieldCondition, Filter, Match, Range, condition::ConditionOneOf,
    r#match::MatchValue,
};
use tracing::{debug, warn};

/// Converts [`PatternFilter`] to a Qdrant [`Filter`] where every condition must hold.
///
/// Mapping:
/// - `String` → `Keyword`
/// - `Bool`   → `Boolean`
/// - `Number` → closed `Range` (`gte == lte`), so integer and float payloads
///   both match by value
///
/// Other value types are skipped with a warning.
pub fn to_qdrant_filter(f: &PatternFilter) -> Filter {
    debug!("filters::to_qdrant_filter equals={}", f.equals.len());

    let mut must: Vec<Condition> = Vec::new();

    for (field, val) in &f.equals {
        let condition = match val {
            serde_json::Value::String(s) => match_condition(field, MatchValue::Keyword(s.clone())),
            serde_json::Value::Bool(b) => match_condition(field, MatchValue::Boolean(*b)),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(v) => FieldCondition {
                    key: field.clone(),
                    range: Some(Range {
                        gte: Some(v),
                        lte: Some(v),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                None => {
                    warn!(field = %field, "number is not representable as f64; skipped");
                    continue;
                }
            },
            _ => {
                warn!(field = %field, "unsupported filter value type; skipped");
                continue;
            }
        };

        must.push(Condition {
            condition_one_of: Some(ConditionOneOf::Field(condition)),
        });
    }

    Filter {
        must,
        ..Default::default()
    }
}

fn match_condition(field: &str, value: MatchValue) -> FieldCondition {
    FieldCondition {
        key: field.to_string(),
        r#match: Some(Match {
            match_value: Some(value),
        }),
        ..Default::default()
    }
}
