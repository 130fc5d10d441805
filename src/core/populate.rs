//! Population: renders templates against one or more locale dictionaries.
//!
//! With a single locale the output is the rendered tree. With several, each
//! templated field is keyed by locale id and the per-locale results are
//! deep-merged, so `"desc": ["{{ ... }}"]` becomes
//! `"desc": { "en": [...], "pt": [...] }`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde_json::{Map, Value};

use super::{
    dictionary::Dictionary,
    emit::{FileOutcome, write_json},
    placeholder::contains_placeholder,
    render::{RenderError, render_str},
    sources::{scan_json_files, scan_locale_files},
};
use crate::{
    config::{Config, resolve_path},
    issues::{Issue, ParseErrorFileType, ParseErrorIssue, RenderFailureIssue},
};

/// A leaf that could not be rendered. It keeps its template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    /// Slash-separated structural location, e.g. `/0/desc/1`.
    pub location: String,
    pub template: String,
    pub error: RenderError,
}

/// Renders every placeholder-bearing string in `tree` in place.
///
/// A failing leaf is left untouched and reported; its siblings still render.
pub fn populate_tree(tree: &mut Value, dictionary: &Dictionary) -> Vec<RenderFailure> {
    let mut failures = Vec::new();
    populate_node(tree, String::new(), dictionary, &mut failures);
    failures
}

fn populate_node(
    value: &mut Value,
    location: String,
    dictionary: &Dictionary,
    failures: &mut Vec<RenderFailure>,
) {
    match value {
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                populate_node(item, format!("{}/{}", location, i), dictionary, failures);
            }
        }
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                let segment = key.replace('~', "~0").replace('/', "~1");
                populate_node(child, format!("{}/{}", location, segment), dictionary, failures);
            }
        }
        Value::String(text) if contains_placeholder(text) => match render_str(text, dictionary) {
            Ok(rendered) => *text = rendered,
            Err(error) => failures.push(RenderFailure {
                location: if location.is_empty() {
                    "/".to_string()
                } else {
                    location
                },
                template: text.clone(),
                error,
            }),
        },
        _ => {}
    }
}

fn is_templated_string(value: &Value) -> bool {
    value.as_str().is_some_and(contains_placeholder)
}

/// An array of strings at least one of which is a placeholder.
fn is_templated_array(items: &[Value]) -> bool {
    items.iter().all(Value::is_string) && items.iter().any(is_templated_string)
}

/// Shapes one locale's rendering for merging: every templated field of
/// `template` becomes `{ locale: rendered }`.
fn project_locale(template: &Value, rendered: Value, locale: &str) -> Value {
    let keyed = |value: Value| {
        let mut map = Map::new();
        map.insert(locale.to_string(), value);
        Value::Object(map)
    };

    match (template, rendered) {
        (Value::Array(items), rendered @ Value::Array(_)) if is_templated_array(items) => {
            keyed(rendered)
        }
        (Value::String(text), rendered) if contains_placeholder(text) => keyed(rendered),
        (Value::Array(items), Value::Array(rendered)) => Value::Array(
            items
                .iter()
                .zip(rendered)
                .map(|(item, rendered)| project_locale(item, rendered, locale))
                .collect(),
        ),
        (Value::Object(fields), Value::Object(rendered)) => Value::Object(
            rendered
                .into_iter()
                .map(|(key, value)| {
                    let projected = match fields.get(&key) {
                        Some(field) => project_locale(field, value, locale),
                        None => value,
                    };
                    (key, projected)
                })
                .collect(),
        ),
        (_, rendered) => rendered,
    }
}

/// Merges `source` into `target`: objects key by key, arrays element by
/// element, anything else replaced.
pub fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => {
            for (i, value) in source.into_iter().enumerate() {
                match target.get_mut(i) {
                    Some(existing) => deep_merge(existing, value),
                    None => target.push(value),
                }
            }
        }
        (target, source) => *target = source,
    }
}

/// Combines per-locale renderings of `template` into one tree.
///
/// A single rendering is returned as-is.
pub fn merge_locales(template: &Value, rendered_by_locale: Vec<(String, Value)>) -> Value {
    let mut renderings = rendered_by_locale.into_iter();
    let Some((first_locale, first)) = renderings.next() else {
        return template.clone();
    };
    if renderings.len() == 0 {
        return first;
    }

    let mut merged = project_locale(template, first, &first_locale);
    for (locale, rendered) in renderings {
        deep_merge(&mut merged, project_locale(template, rendered, &locale));
    }
    merged
}

// ============================================================
// Locales
// ============================================================

/// Locale dictionaries to render against, in a stable order.
#[derive(Debug, Default)]
pub struct LocaleSet {
    pub locales: Vec<(String, Dictionary)>,
    /// Locale files that could not be loaded.
    pub issues: Vec<Issue>,
}

impl LocaleSet {
    pub fn ids(&self) -> Vec<&str> {
        self.locales.iter().map(|(id, _)| id.as_str()).collect()
    }
}

/// Loads the locales population renders against.
///
/// From `locales_dir` when one is configured (`<locale>.json` each),
/// otherwise the source locale file under `source_locale`. A non-empty
/// `only` restricts the set to those ids.
pub fn load_locales(
    config: &Config,
    root: &Path,
    only: &[String],
    verbose: bool,
) -> Result<LocaleSet> {
    let wanted = |id: &str| only.is_empty() || only.iter().any(|o| o == id);

    let Some(locales_dir) = &config.locales_dir else {
        if !wanted(config.source_locale.as_str()) {
            bail!(
                "Locale(s) {} not available: no 'localesDir' is configured and the source locale is '{}'.",
                only.join(", "),
                config.source_locale
            );
        }
        let path = resolve_path(root, &config.source_locale_file);
        let dictionary = Dictionary::load(&path).with_context(|| {
            format!(
                "Cannot load source locale '{}' (run `lexis extract` first)",
                config.source_locale
            )
        })?;
        return Ok(LocaleSet {
            locales: vec![(config.source_locale.clone(), dictionary)],
            issues: Vec::new(),
        });
    };

    let files: Vec<(String, PathBuf)> = scan_locale_files(&resolve_path(root, locales_dir), verbose)?
        .into_iter()
        .filter(|(id, _)| wanted(id.as_str()))
        .collect();

    if let Some(missing) = only.iter().find(|id| !files.iter().any(|(f, _)| f == *id)) {
        bail!("Locale '{}' not found in '{}'.", missing, locales_dir);
    }

    let loaded: Vec<_> = files
        .par_iter()
        .map(|(id, path)| (id, path, Dictionary::load(path)))
        .collect();

    let mut set = LocaleSet::default();
    for (id, path, result) in loaded {
        match result {
            Ok(dictionary) => set.locales.push((id.clone(), dictionary)),
            Err(e) => set.issues.push(Issue::ParseError(ParseErrorIssue {
                file_path: path.to_string_lossy().to_string(),
                error: format!("{:#}", e),
                file_type: ParseErrorFileType::Locale,
            })),
        }
    }

    if set.locales.is_empty() {
        bail!("No locale file in '{}' could be loaded.", locales_dir);
    }

    Ok(set)
}

// ============================================================
// Batch
// ============================================================

/// Summary of a population run.
#[derive(Debug)]
pub struct PopulateReport {
    pub templates_found: usize,
    pub locales: Vec<String>,
    pub issues: Vec<Issue>,
    pub outcomes: Vec<FileOutcome>,
}

impl PopulateReport {
    pub fn files_written(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }
}

fn read_template(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

fn populate_file(
    path: &Path,
    locales: &[(String, Dictionary)],
    output_dir: &Path,
) -> (Vec<Issue>, Option<FileOutcome>) {
    let file_path = path.to_string_lossy().to_string();

    let template = match read_template(path) {
        Ok(template) => template,
        Err(e) => {
            let issue = Issue::ParseError(ParseErrorIssue {
                file_path,
                error: format!("{:#}", e),
                file_type: ParseErrorFileType::Template,
            });
            return (vec![issue], None);
        }
    };

    let mut issues = Vec::new();
    let mut rendered_by_locale = Vec::with_capacity(locales.len());

    for (locale, dictionary) in locales {
        let mut rendered = template.clone();
        for failure in populate_tree(&mut rendered, dictionary) {
            issues.push(Issue::RenderFailure(RenderFailureIssue {
                file_path: file_path.clone(),
                locale: locale.clone(),
                location: failure.location,
                template: failure.template,
                error: failure.error.to_string(),
            }));
        }
        rendered_by_locale.push((locale.clone(), rendered));
    }

    let output = merge_locales(&template, rendered_by_locale);
    let Some(file_name) = path.file_name() else {
        return (issues, None);
    };
    let outcome = write_json(&output_dir.join(file_name), &output);
    issues.extend(outcome.to_issue());

    (issues, Some(outcome))
}

/// Renders every template in `templates_dir` and writes the results, under
/// the same file names, to `output_dir`. Templates are processed in parallel.
pub fn populate_dir(
    templates_dir: &Path,
    locales: &[(String, Dictionary)],
    output_dir: &Path,
    verbose: bool,
) -> Result<PopulateReport> {
    if !templates_dir.is_dir() {
        bail!(
            "Templates directory '{}' does not exist.\n\
             Hint: Run `lexis extract` first, or check 'templatesDir'.",
            templates_dir.display()
        );
    }

    let templates = scan_json_files(templates_dir, verbose).files;
    if templates.is_empty() {
        bail!("No templates found in '{}'.", templates_dir.display());
    }

    let results: Vec<_> = templates
        .par_iter()
        .map(|path| populate_file(path, locales, output_dir))
        .collect();

    let mut issues = Vec::new();
    let mut outcomes = Vec::new();
    for (file_issues, outcome) in results {
        issues.extend(file_issues);
        outcomes.extend(outcome);
    }

    Ok(PopulateReport {
        templates_found: templates.len(),
        locales: locales.iter().map(|(id, _)| id.clone()).collect(),
        issues,
        outcomes,
    })
}
