use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use crate::config::Delimiters;

/// Result of writing a value at a dotted path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetOutcome {
    /// The path was empty and now holds the value.
    Added,
    /// The path already held exactly this value.
    Unchanged,
    /// The path already holds something else. The dictionary is left
    /// untouched.
    Collision { existing: String },
    /// A prefix of the path holds text, so nothing can live below it.
    /// The dictionary is left untouched.
    Blocked { at: String, existing: String },
}

/// Nested mapping from dotted path to localized text.
///
/// During extraction paths are write-once: a second write to an occupied
/// path never replaces the first value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    root: Map<String, Value>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dictionary holding only the `common.delimiters` sub-tree used when
    /// rejoining lists.
    pub fn seeded(delimiters: &Delimiters) -> Self {
        let mut dictionary = Self::new();
        dictionary.set(crate::utils::AND_DELIMITER_PATH, &delimiters.and);
        dictionary.set(
            crate::utils::OXFORD_DELIMITER_PATH,
            &delimiters.and_with_oxford_comma,
        );
        dictionary
    }

    /// Wraps a parsed locale document. The root must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => bail!(
                "Root of a locale file must be an object, found {}",
                json_kind(&other)
            ),
        }
    }

    /// Reads and parses a locale file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read locale file: {}", path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse locale file: {}", path.display()))?;
        Self::from_value(value).with_context(|| format!("Invalid locale file: {}", path.display()))
    }

    /// Writes `value` at `path` unless the path is already taken.
    ///
    /// Missing parents are created: an array when the next segment is an
    /// array index (`0`, `1`, ...), an object otherwise. Arrays grow with
    /// `null` holes, and a `null` slot counts as empty.
    pub fn set(&mut self, path: &str, value: &str) -> SetOutcome {
        let parts: Vec<&str> = path.split('.').collect();
        let Some((first, _)) = parts.split_first() else {
            return SetOutcome::Unchanged;
        };
        let slot = self.root.entry(first.to_string()).or_insert(Value::Null);
        insert_at(slot, &parts, 1, value)
    }

    /// Looks up a dotted path. Numeric segments also index into arrays.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.root.get(first)?;

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Number of string leaves.
    pub fn len(&self) -> usize {
        fn count(value: &Value) -> usize {
            match value {
                Value::Object(map) => map.values().map(count).sum(),
                Value::Array(items) => items.iter().map(count).sum(),
                Value::String(_) => 1,
                _ => 0,
            }
        }
        self.root.values().map(count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }
}

/// Short human name of a JSON value's type, used in error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn describe_existing(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => json_kind(other).to_string(),
    }
}

/// Parses a path segment that addresses an array element.
fn array_index(segment: &str) -> Option<usize> {
    let canonical = segment == "0"
        || (!segment.starts_with('0') && segment.bytes().all(|b| b.is_ascii_digit()));
    if canonical { segment.parse().ok() } else { None }
}

/// Writes `value` below `slot`, which sits at `path[..depth]`.
fn insert_at(slot: &mut Value, path: &[&str], depth: usize, value: &str) -> SetOutcome {
    let Some(segment) = path.get(depth) else {
        return match slot {
            Value::Null => {
                *slot = Value::String(value.to_string());
                SetOutcome::Added
            }
            Value::String(existing) if existing.as_str() == value => SetOutcome::Unchanged,
            existing => SetOutcome::Collision {
                existing: describe_existing(existing),
            },
        };
    };

    let index = array_index(segment);
    if slot.is_null() {
        *slot = match index {
            Some(_) => Value::Array(Vec::new()),
            None => Value::Object(Map::new()),
        };
    }

    match (slot, index) {
        (Value::Object(map), _) => {
            let child = map.entry(segment.to_string()).or_insert(Value::Null);
            insert_at(child, path, depth + 1, value)
        }
        (Value::Array(items), Some(index)) => {
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            insert_at(&mut items[index], path, depth + 1, value)
        }
        (other, _) => SetOutcome::Blocked {
            at: path[..depth].join("."),
            existing: describe_existing(other),
        },
    }
}
