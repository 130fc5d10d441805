use std::collections::HashMap;

use crate::utils::capitalize;

/// A list item that already has a dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternedItem<'a> {
    pub path: &'a str,
    /// Only the capitalized form was interned, so the placeholder must
    /// lowercase it at render time.
    pub downcase: bool,
}

/// Maps extracted text to the first dictionary path allocated for it.
///
/// Grows monotonically over one extraction run. Phrases and list items
/// share the index, so a list item like `fire` can reuse the path of a
/// `Fire` phrase interned earlier.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    paths: HashMap<String, String>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        self.paths.get(text).map(String::as_str)
    }

    /// Records `path` for `text` unless the text is already interned.
    ///
    /// Returns the path the text resolves to from now on.
    pub fn record(&mut self, text: &str, path: &str) -> &str {
        self.paths
            .entry(text.to_string())
            .or_insert_with(|| path.to_string())
    }

    /// Looks a list item up by its exact text, then by its capitalized form.
    pub fn lookup_list_item(&self, item: &str) -> Option<InternedItem<'_>> {
        if let Some(path) = self.get(item) {
            return Some(InternedItem {
                path,
                downcase: false,
            });
        }

        self.get(&capitalize(item)).map(|path| InternedItem {
            path,
            downcase: true,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
