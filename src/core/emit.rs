//! Template and source-locale writers.
//!
//! Writes never abort a batch: each file reports its own outcome.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::Value;

use super::dictionary::Dictionary;
use crate::issues::{Issue, WriteErrorIssue};

/// Result of writing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// The failure as a reportable issue, if the write failed.
    pub fn to_issue(&self) -> Option<Issue> {
        self.error.as_ref().map(|error| {
            Issue::WriteError(WriteErrorIssue {
                file_path: self.path.to_string_lossy().to_string(),
                error: error.clone(),
            })
        })
    }
}

/// Serializes `value` as 2-space pretty JSON with a trailing newline,
/// creating parent directories as needed.
pub fn try_write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;

    fs::write(path, format!("{}\n", content))
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

pub fn write_json(path: &Path, value: &Value) -> FileOutcome {
    FileOutcome {
        path: path.to_path_buf(),
        error: try_write_json(path, value).err().map(|e| format!("{:#}", e)),
    }
}

/// Writes one template per source file into `templates_dir`, keeping each
/// source file name. Files are written in parallel; outcomes keep input order.
pub fn emit_templates(templates_dir: &Path, templates: &[(String, Value)]) -> Vec<FileOutcome> {
    templates
        .par_iter()
        .map(|(file_name, tree)| write_json(&templates_dir.join(file_name), tree))
        .collect()
}

pub fn emit_source_locale(path: &Path, dictionary: &Dictionary) -> FileOutcome {
    write_json(path, &Value::Object(dictionary.as_map().clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_write_json_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.json");

        let outcome = write_json(&path, &json!({ "b": 1, "a": [true] }));

        assert!(outcome.is_ok());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "{\n  \"b\": 1,\n  \"a\": [\n    true\n  ]\n}\n"
        );
    }

    #[test]
    fn test_write_failure_is_reported_not_raised() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let outcome = write_json(&blocker.join("out.json"), &json!({}));

        assert!(!outcome.is_ok());
        let issue = outcome.to_issue().unwrap();
        assert!(matches!(issue, Issue::WriteError(_)));
    }

    #[test]
    fn test_emit_templates_keeps_order() {
        let dir = tempdir().unwrap();
        let templates = vec![
            ("5e-SRD-B.json".to_string(), json!([1])),
            ("5e-SRD-A.json".to_string(), json!([2])),
        ];

        let outcomes = emit_templates(dir.path(), &templates);

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].path.ends_with("5e-SRD-B.json"));
        assert!(outcomes.iter().all(FileOutcome::is_ok));
        assert_eq!(
            fs::read_to_string(dir.path().join("5e-SRD-A.json")).unwrap(),
            "[\n  2\n]\n"
        );
    }

    #[test]
    fn test_emit_source_locale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("source-locale.json");
        let mut dictionary = Dictionary::new();
        dictionary.set("spells.x.name", "X");

        assert!(emit_source_locale(&path, &dictionary).is_ok());
        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({ "spells": { "x": { "name": "X" } } }));
    }
}
