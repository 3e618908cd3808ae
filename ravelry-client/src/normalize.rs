//! Raw Ravelry detail payloads → flat [`PatternRecord`]s.
//!
//! The detail endpoint returns `{"patterns": {"<id>": {...}}}` where each pattern
//! is a deeply nested object. Optional fields fall back to fixed defaults; a
//! pattern missing `id`, `name`, `downloadable` or `free` is skipped and logged.
//!
//! Category taxonomies nest to arbitrary depth, so `category` is built by
//! scanning the whole category sub-tree for a target key (see
//! [`extract_key_values`]) instead of walking a known shape.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::DEFAULT_LIBRARY_URL;
use crate::errors::NormalizeError;
use crate::record::{PatternRecord, UNKNOWN};

/// Knobs for [`normalize_pattern`]; the defaults match the Ravelry schema.
#[derive(Clone, Debug)]
pub struct NormalizeOptions {
    /// Key of the category sub-tree inside a pattern.
    pub category_key: String,
    /// Key whose values become category tags.
    pub target_key: String,
    /// Tag value that is never collected.
    pub sentinel: String,
    /// Prefix for the pattern page URL.
    pub library_url: String,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            category_key: "pattern_categories".into(),
            target_key: "permalink".into(),
            sentinel: "categories".into(),
            library_url: DEFAULT_LIBRARY_URL.into(),
        }
    }
}

/// Collects every scalar found under `target_key` anywhere in `node`.
///
/// Mappings and sequences are traversed to any depth. A scalar under
/// `target_key` is collected (as text) unless it equals `sentinel` or is blank;
/// a container under `target_key` is traversed like any other node.
pub fn extract_key_values(node: &Value, target_key: &str, sentinel: &str) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    collect_key_values(node, target_key, sentinel, &mut found);
    found
}

fn collect_key_values(node: &Value, target_key: &str, sentinel: &str, out: &mut BTreeSet<String>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                if key == target_key {
                    if let Some(text) = scalar_text(value) {
                        let text = text.trim();
                        if !text.is_empty() && text != sentinel {
                            out.insert(text.to_string());
                        }
                        continue;
                    }
                }
                collect_key_values(value, target_key, sentinel, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_key_values(item, target_key, sentinel, out);
            }
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {}
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Builds one [`PatternRecord`] from one raw pattern object.
///
/// # Errors
/// [`NormalizeError::NotAnObject`] if `raw` is not a mapping,
/// [`NormalizeError::MissingField`] if a required field is absent or mistyped.
pub fn normalize_pattern(
    raw: &Value,
    opts: &NormalizeOptions,
) -> Result<PatternRecord, NormalizeError> {
    let obj = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    let id = obj
        .get("id")
        .and_then(as_id)
        .ok_or(NormalizeError::MissingField("id"))?;
    let name = obj
        .get("name")
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingField("name"))?
        .to_string();
    let downloadable = required_bool(obj, "downloadable")?;
    let free = required_bool(obj, "free")?;

    let permalink = obj.get("permalink").and_then(Value::as_str).unwrap_or("");
    let category = obj
        .get(&opts.category_key)
        .map(|tree| {
            let tags = extract_key_values(tree, &opts.target_key, &opts.sentinel);
            tags.into_iter().collect::<Vec<_>>().join(" ")
        })
        .unwrap_or_default();

    Ok(PatternRecord {
        id,
        name,
        designer: nested_str(obj, "pattern_author", "name").unwrap_or(UNKNOWN).to_string(),
        difficulty: obj
            .get("difficulty_average")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        yarn_weight: nested_str(obj, "yarn_weight", "name").unwrap_or(UNKNOWN).to_string(),
        notes: obj
            .get("notes")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        url: format!("{}{}", opts.library_url, permalink),
        category,
        downloadable,
        free,
    })
}

/// Normalizes a whole detail-fetch response into `id → PatternRecord`.
///
/// Accepts either the full body (`{"patterns": {...}}`) or the bare
/// `id → pattern` mapping. Patterns failing [`normalize_pattern`] are skipped
/// with a `warn!`; the rest of the batch is kept. Output is ordered by id.
pub fn normalize_details(raw: &Value, opts: &NormalizeOptions) -> BTreeMap<u64, PatternRecord> {
    let patterns = raw.get("patterns").unwrap_or(raw);
    let mut out = BTreeMap::new();

    let Some(map) = patterns.as_object() else {
        warn!("detail payload has no pattern mapping; nothing to normalize");
        return out;
    };

    for (key, pattern) in map {
        match normalize_pattern(pattern, opts) {
            Ok(rec) => {
                out.insert(rec.id, rec);
            }
            Err(err) => warn!(pattern_key = %key, error = %err, "skipping pattern"),
        }
    }

    debug!(input = map.len(), normalized = out.len(), "normalize_details done");
    out
}

fn as_id(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_bool(obj: &Map<String, Value>, field: &'static str) -> Result<bool, NormalizeError> {
    obj.get(field)
        .and_then(Value::as_bool)
        .ok_or(NormalizeError::MissingField(field))
}

fn nested_str<'a>(obj: &'a Map<String, Value>, outer: &str, inner: &str) -> Option<&'a str> {
    obj.get(outer)?.get(inner)?.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cardigan_payload() -> Value {
        json!({
            "patterns": {
                "12345": {
                    "id": 12345,
                    "name": "Harvest Cardigan",
                    "permalink": "harvest-cardigan",
                    "downloadable": true,
                    "free": false,
                    "pattern_categories": {
                        "permalink": "cardigan",
                        "categories": [
                            { "categories": "categories", "permalink": "dk-cardigan" }
                        ]
                    }
                }
            }
        })
    }

    #[test]
    fn nested_category_tree_becomes_sorted_tag_set() {
        let out = normalize_details(&cardigan_payload(), &NormalizeOptions::default());
        let rec = &out[&12345];

        let mut tokens: Vec<&str> = rec.category.split(' ').collect();
        tokens.sort();
        assert_eq!(tokens, vec!["cardigan", "dk-cardigan"]);
        assert_eq!(rec.category, "cardigan dk-cardigan");
    }

    #[test]
    fn optional_fields_get_defaults() {
        let out = normalize_details(&cardigan_payload(), &NormalizeOptions::default());
        let rec = &out[&12345];
        assert_eq!(rec.designer, "Unknown");
        assert_eq!(rec.yarn_weight, "Unknown");
        assert_eq!(rec.difficulty, 0.0);
        assert_eq!(rec.notes, "");
        assert_eq!(
            rec.url,
            "https://www.ravelry.com/patterns/library/harvest-cardigan"
        );
    }

    #[test]
    fn present_optional_fields_are_flattened() {
        let raw = json!({
            "id": 7,
            "name": "Vanilla Socks",
            "downloadable": false,
            "free": true,
            "notes": "Toe-up, fits most feet.",
            "difficulty_average": 2.75,
            "pattern_author": { "id": 1, "name": "Ann Knitter" },
            "yarn_weight": { "name": "Fingering", "ply": "4" }
        });
        let rec = normalize_pattern(&raw, &NormalizeOptions::default()).unwrap();
        assert_eq!(rec.designer, "Ann Knitter");
        assert_eq!(rec.yarn_weight, "Fingering");
        assert_eq!(rec.difficulty, 2.75);
        assert_eq!(rec.notes, "Toe-up, fits most feet.");
        assert_eq!(rec.category, "");
        assert!(rec.free && !rec.downloadable);
    }

    #[test]
    fn null_optionals_fall_back_too() {
        let raw = json!({
            "id": 8, "name": "Hat", "downloadable": true, "free": true,
            "difficulty_average": null, "pattern_author": null, "notes": null
        });
        let rec = normalize_pattern(&raw, &NormalizeOptions::default()).unwrap();
        assert_eq!(rec.designer, "Unknown");
        assert_eq!(rec.difficulty, 0.0);
        assert_eq!(rec.notes, "");
    }

    #[test]
    fn sentinel_and_duplicates_never_reach_the_tag_set() {
        let tree = json!([
            { "permalink": "categories", "categories": [
                { "permalink": "hat", "categories": [ { "permalink": "beanie" } ] },
                { "permalink": "hat" }
            ]},
            { "permalink": "beanie", "parent": { "permalink": "accessories" } }
        ]);
        let tags = extract_key_values(&tree, "permalink", "categories");
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["accessories", "beanie", "hat"]
        );
    }

    #[test]
    fn numeric_values_and_nested_targets_are_handled() {
        let tree = json!({
            "permalink": { "permalink": "inner" },
            "other": [ { "permalink": 42 }, { "permalink": null }, { "permalink": "  " } ]
        });
        let tags = extract_key_values(&tree, "permalink", "categories");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["42", "inner"]);
    }

    #[test]
    fn missing_required_field_skips_only_that_record() {
        let raw = json!({
            "patterns": {
                "1": { "id": 1, "name": "Ok", "downloadable": true, "free": true },
                "2": { "id": 2, "name": "No free flag", "downloadable": true },
                "3": { "name": "No id", "downloadable": true, "free": true },
                "4": "not an object"
            }
        });
        let out = normalize_details(&raw, &NormalizeOptions::default());
        assert_eq!(out.keys().copied().collect::<Vec<_>>(), vec![1]);

        let err = normalize_pattern(&raw["patterns"]["2"], &NormalizeOptions::default());
        assert_eq!(err, Err(NormalizeError::MissingField("free")));
        let err = normalize_pattern(&raw["patterns"]["4"], &NormalizeOptions::default());
        assert_eq!(err, Err(NormalizeError::NotAnObject));
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let opts = NormalizeOptions::default();
        let a = serde_json::to_string(&normalize_details(&cardigan_payload(), &opts)).unwrap();
        let b = serde_json::to_string(&normalize_details(&cardigan_payload(), &opts)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bare_mapping_and_string_ids_are_accepted() {
        let raw = json!({ "99": { "id": "99", "name": "Cowl", "downloadable": true, "free": false } });
        let out = normalize_details(&raw, &NormalizeOptions::default());
        assert_eq!(out[&99].name, "Cowl");
    }
}
