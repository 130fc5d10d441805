//! Detection of pointer records such as
//! `{ "index": "acid", "name": "Acid", "url": "/api/damage-types/acid" }`.
//!
//! Detection looks only at the field set, never at field names elsewhere in
//! the tree, so a reference resolves to the same dictionary region at any
//! nesting depth.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static API_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/?api/").unwrap());

const REFERENCE_KEYS: [&str; 3] = ["index", "name", "url"];
const LEVEL_REFERENCE_KEYS: [&str; 4] = ["index", "name", "type", "url"];
const LEVEL_REFERENCE_TYPE: &str = "level";

fn has_exact_keys(map: &Map<String, Value>, keys: &[&str]) -> bool {
    map.len() == keys.len() && keys.iter().all(|key| map.contains_key(*key))
}

/// Whether an object is a reference record rather than free data.
///
/// True for exactly `{index, name, url}`, or exactly `{index, name, type, url}`
/// with `type == "level"`. The `url` must be a string.
pub fn is_reference(map: &Map<String, Value>) -> bool {
    if !matches!(map.get("url"), Some(Value::String(_))) {
        return false;
    }

    has_exact_keys(map, &REFERENCE_KEYS)
        || (has_exact_keys(map, &LEVEL_REFERENCE_KEYS)
            && map.get("type").and_then(Value::as_str) == Some(LEVEL_REFERENCE_TYPE))
}

/// The dictionary path a reference's own fields live under.
///
/// ```
/// use lexis::core::reference::url_to_path;
///
/// assert_eq!(url_to_path("/api/damage-types/acid"), "damage_types.acid");
/// assert_eq!(url_to_path("/api/classes/wizard/levels/1"), "classes.wizard.levels.1");
/// ```
pub fn url_to_path(url: &str) -> String {
    API_PREFIX_REGEX
        .replace(url, "")
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace('-', "_"))
        .collect::<Vec<_>>()
        .join(".")
}

/// The path for a reference object, if it is one.
pub fn reference_path(map: &Map<String, Value>) -> Option<String> {
    if !is_reference(map) {
        return None;
    }
    map.get("url").and_then(Value::as_str).map(url_to_path)
}
