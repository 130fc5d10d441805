//! Depth-first traversal of a JSON tree with dictionary-path computation.
//!
//! The path handed to the visitor is not the structural position of a leaf:
//! - an array whose elements are all objects with a truthy `index` uses each
//!   element's `index` (hyphens as underscores) instead of its position,
//! - a property named after a known domain restarts the path at that domain,
//! - a reference record restarts the path at the location its `url` names.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use super::reference::reference_path;

/// Property names that restart the path under a different domain name.
const DOMAIN_ALIASES: &[(&str, &str)] = &[("proficiency_choices", "proficiencies")];

/// How a node is reached from its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// The root of a file.
    Root,
    /// A position in an array.
    Index(usize),
    /// An object key, or the `index` name standing in for an array position.
    Key(String),
}

impl Property {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Property::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Root => Ok(()),
            Property::Index(i) => write!(f, "{}", i),
            Property::Key(key) => write!(f, "{}", key),
        }
    }
}

/// A scalar reached by the walk.
pub struct Leaf<'a> {
    pub value: &'a mut Value,
    pub property: Property,
    /// Dictionary path of this leaf, including its own property.
    pub path: &'a str,
}

/// Second-to-last segment of a dotted path, or `""` for single segments.
pub fn parent_property(path: &str) -> &str {
    let mut segments = path.rsplit('.');
    segments.next();
    segments.next().unwrap_or_default()
}

/// Names that restart the path when used as a property.
pub struct WalkContext<'a> {
    pub domains: &'a HashSet<String>,
}

/// Walks `value`, starting at `root_path`, calling `visitor` once per scalar.
///
/// Object keys and array elements are visited in source order.
pub fn walk<F>(value: &mut Value, root_path: &str, ctx: &WalkContext<'_>, visitor: &mut F)
where
    F: FnMut(Leaf<'_>),
{
    walk_node(value, Property::Root, root_path, ctx, visitor);
}

fn walk_node<F>(
    value: &mut Value,
    property: Property,
    path: &str,
    ctx: &WalkContext<'_>,
    visitor: &mut F,
) where
    F: FnMut(Leaf<'_>),
{
    let mut current_path = child_path(path, &property, ctx);

    match value {
        Value::Array(items) => {
            let keyed = is_index_keyed(items);
            for (i, item) in items.iter_mut().enumerate() {
                let child = match keyed.then(|| index_name(item)).flatten() {
                    Some(name) => Property::Key(name),
                    None => Property::Index(i),
                };
                walk_node(item, child, &current_path, ctx, visitor);
            }
        }
        Value::Object(map) => {
            if let Some(reference) = reference_path(map) {
                current_path = reference;
            }
            for (key, child) in map.iter_mut() {
                let property = Property::Key(key.clone());
                walk_node(child, property, &current_path, ctx, visitor);
            }
        }
        scalar => visitor(Leaf {
            value: scalar,
            property,
            path: &current_path,
        }),
    }
}

/// Path of a node given its parent's path and its own property.
pub fn child_path(path: &str, property: &Property, ctx: &WalkContext<'_>) -> String {
    if let Some(key) = property.as_key() {
        if ctx.domains.contains(key) {
            return key.to_string();
        }
        if let Some((_, alias)) = DOMAIN_ALIASES.iter().find(|(name, _)| *name == key) {
            return alias.to_string();
        }
    }

    let segment = property.to_string();
    match (path.is_empty(), segment.is_empty()) {
        (_, true) => path.to_string(),
        (true, false) => segment,
        (false, false) => format!("{}.{}", path, segment),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether every element is an object carrying a truthy `index`.
pub fn is_index_keyed(items: &[Value]) -> bool {
    items
        .iter()
        .all(|item| item.get("index").is_some_and(is_truthy))
}

/// Path segment for an element of an index-keyed array.
fn index_name(item: &Value) -> Option<String> {
    match item.get("index")? {
        Value::String(s) => Some(s.replace('-', "_")),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
