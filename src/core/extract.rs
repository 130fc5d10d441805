//! Extraction: turns source trees into templates plus one source locale.
//!
//! An [`ExtractionSession`] owns everything that is shared across files
//! (the dictionary, the duplicate index and collected issues). Files are
//! extracted one at a time in a fixed order because the first file to
//! intern a phrase decides its dictionary path.

use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::Value;

use super::{
    classify::{Classification, LeafInfo, ListBucket, classify},
    dictionary::{Dictionary, SetOutcome},
    emit::{FileOutcome, emit_source_locale, emit_templates},
    interner::DuplicateIndex,
    placeholder::{Filter, Placeholder},
    sources::{SourceFile, order_source_files, scan_source_files},
    walker::{Leaf, WalkContext, walk},
};
use crate::{
    config::{Config, Delimiters, resolve_path},
    issues::{
        Issue, KeyCollisionIssue, ParseErrorFileType, ParseErrorIssue, UncategorizedIssue,
    },
    utils::{make_comma_separated_string, sanitize, to_variable, variable_token},
};

/// Shared state for one extraction run.
#[derive(Debug)]
pub struct ExtractionSession {
    domains: HashSet<String>,
    dictionary: Dictionary,
    index: DuplicateIndex,
    issues: Vec<Issue>,
}

impl ExtractionSession {
    /// Starts a session over a closed set of domain names. The dictionary
    /// starts out holding the list delimiters.
    pub fn new(domains: impl IntoIterator<Item = String>, delimiters: &Delimiters) -> Self {
        Self {
            domains: domains.into_iter().collect(),
            dictionary: Dictionary::seeded(delimiters),
            index: DuplicateIndex::new(),
            issues: Vec::new(),
        }
    }

    /// Rewrites `tree` into its template in place, adding its text to the
    /// dictionary. `file` labels any issues found.
    pub fn extract_tree(&mut self, file: &str, tree: &mut Value, domain: &str) {
        let ctx = WalkContext {
            domains: &self.domains,
        };
        let mut extractor = Extractor {
            file,
            dictionary: &mut self.dictionary,
            index: &mut self.index,
            issues: &mut self.issues,
        };
        walk(tree, domain, &ctx, &mut |leaf: Leaf<'_>| extractor.separate(leaf));
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn finish(self) -> (Dictionary, Vec<Issue>) {
        (self.dictionary, self.issues)
    }
}

/// Per-file view of the session used while walking.
struct Extractor<'a> {
    file: &'a str,
    dictionary: &'a mut Dictionary,
    index: &'a mut DuplicateIndex,
    issues: &'a mut Vec<Issue>,
}

impl Extractor<'_> {
    fn separate(&mut self, leaf: Leaf<'_>) {
        let decision = classify(&LeafInfo {
            value: &*leaf.value,
            property: &leaf.property,
            path: leaf.path,
        });
        let text = leaf.value.as_str().unwrap_or_default().to_string();

        let replacement = match decision {
            Classification::Literal => None,
            Classification::Uncategorized => {
                self.uncategorized(leaf.path, &text, None);
                None
            }
            Classification::Unkeyable { rule } => {
                let reason = format!("matched the {} rule but sanitizes to an empty key", rule);
                self.uncategorized(leaf.path, &text, Some(reason));
                None
            }
            Classification::Phrase => self.intern_phrase(leaf.path, &text),
            Classification::Measurement {
                path,
                value,
                numbers,
            } => self.store(&path, &value, &text).map(|stored| {
                numbers
                    .into_iter()
                    .enumerate()
                    .fold(Placeholder::new(stored), |placeholder, (i, number)| {
                        placeholder.with_filter(Filter::Replace {
                            from: variable_token(&to_variable(i)),
                            to: number,
                        })
                    })
                    .to_string()
            }),
            Classification::List {
                bucket,
                items,
                has_and,
                oxford_comma,
            } => {
                let placeholders: Vec<String> = items
                    .iter()
                    .map(|item| self.intern_list_item(leaf.path, bucket, item))
                    .collect();
                Some(if has_and {
                    make_comma_separated_string(&placeholders, oxford_comma)
                } else {
                    placeholders.join(", ")
                })
            }
            Classification::Keyed { path, .. } => self
                .store(&path, &text, &text)
                .map(|stored| Placeholder::new(stored).to_string()),
        };

        if let Some(replacement) = replacement {
            *leaf.value = Value::String(replacement);
        }
    }

    /// Interns a phrase at the leaf's own path, or reuses the path of an
    /// identical phrase seen earlier.
    fn intern_phrase(&mut self, path: &str, text: &str) -> Option<String> {
        if let Some(existing) = self.index.get(text) {
            return Some(Placeholder::new(existing).to_string());
        }

        let stored = self.store(path, text, text)?;
        self.index.record(text, &stored);
        Some(Placeholder::new(stored).to_string())
    }

    fn intern_list_item(&mut self, leaf_path: &str, bucket: ListBucket, item: &str) -> String {
        if let Some(found) = self.index.lookup_list_item(item) {
            let placeholder = Placeholder::new(found.path);
            return if found.downcase {
                placeholder.with_filter(Filter::Downcase).to_string()
            } else {
                placeholder.to_string()
            };
        }

        let key = sanitize(item);
        if key.is_empty() {
            let reason = "list item sanitizes to an empty key".to_string();
            self.uncategorized(leaf_path, item, Some(reason));
            return item.to_string();
        }

        let path = format!("{}.{}", bucket.prefix(), key);
        match self.store(&path, item, item) {
            Some(stored) => {
                self.index.record(item, &stored);
                Placeholder::new(stored).to_string()
            }
            None => item.to_string(),
        }
    }

    /// Writes `value` at `path`, moving to `path_2`, `path_3`, ... when the
    /// path already holds different text. Returns where the value lives, or
    /// `None` when nothing could be stored.
    fn store(&mut self, path: &str, value: &str, text: &str) -> Option<String> {
        let existing = match self.dictionary.set(path, value) {
            SetOutcome::Added | SetOutcome::Unchanged => return Some(path.to_string()),
            SetOutcome::Blocked { existing, .. } => {
                self.collision(path, existing, text, None);
                return None;
            }
            SetOutcome::Collision { existing } => existing,
        };

        let mut suffix = 2;
        loop {
            let candidate = format!("{}_{}", path, suffix);
            match self.dictionary.set(&candidate, value) {
                SetOutcome::Added => {
                    self.collision(path, existing, text, Some(candidate.clone()));
                    return Some(candidate);
                }
                // Relocated by an earlier occurrence of the same text.
                SetOutcome::Unchanged => return Some(candidate),
                SetOutcome::Collision { .. } => suffix += 1,
                SetOutcome::Blocked { .. } => {
                    self.collision(path, existing, text, None);
                    return None;
                }
            }
        }
    }

    fn collision(&mut self, path: &str, existing: String, text: &str, relocated_to: Option<String>) {
        self.issues.push(Issue::KeyCollision(KeyCollisionIssue {
            file_path: self.file.to_string(),
            path: path.to_string(),
            existing,
            text: text.to_string(),
            relocated_to,
        }));
    }

    fn uncategorized(&mut self, path: &str, text: &str, reason: Option<String>) {
        self.issues.push(Issue::Uncategorized(UncategorizedIssue {
            file_path: self.file.to_string(),
            path: path.to_string(),
            text: text.to_string(),
            reason,
        }));
    }
}

// ============================================================
// Batch
// ============================================================

/// Summary of an extraction run.
#[derive(Debug)]
pub struct ExtractReport {
    /// Source files turned into templates.
    pub files_extracted: usize,
    /// String entries in the source locale, delimiters included.
    pub dictionary_entries: usize,
    pub issues: Vec<Issue>,
    pub template_outcomes: Vec<FileOutcome>,
    pub source_locale_outcome: FileOutcome,
}

impl ExtractReport {
    pub fn files_written(&self) -> usize {
        self.template_outcomes.iter().filter(|o| o.is_ok()).count()
            + usize::from(self.source_locale_outcome.is_ok())
    }
}

fn read_tree(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

/// Extracts every source file under the configured source directory, then
/// writes the templates and, once all files are done, the source locale.
///
/// Fails only when the source directory is missing or holds no source
/// files; unreadable files and failed writes become issues.
pub fn extract_dir(config: &Config, root: &Path, verbose: bool) -> Result<ExtractReport> {
    let source_dir = resolve_path(root, &config.source_dir);
    let sources = scan_source_files(
        &source_dir,
        &config.file_prefix,
        &config.ignore_patterns(),
        verbose,
    )?;
    let sources = order_source_files(sources, &config.deferred_files);

    // Domains are fixed before any file is extracted.
    let domains: Vec<String> = sources.iter().map(|s| s.domain.clone()).collect();

    let parsed: Vec<(&SourceFile, Result<Value>)> = sources
        .par_iter()
        .map(|source| (source, read_tree(&source.path)))
        .collect();

    let mut session = ExtractionSession::new(domains, &config.delimiters);
    let mut parse_errors = Vec::new();
    let mut templates = Vec::with_capacity(parsed.len());

    for (source, result) in parsed {
        let file_path = source.path.to_string_lossy().to_string();
        match result {
            Ok(mut tree) => {
                if verbose {
                    eprintln!("Extracting {} ({})", file_path, source.domain);
                }
                session.extract_tree(&file_path, &mut tree, &source.domain);
                templates.push((source.file_name.clone(), tree));
            }
            Err(e) => parse_errors.push(Issue::ParseError(ParseErrorIssue {
                file_path,
                error: format!("{:#}", e),
                file_type: ParseErrorFileType::Source,
            })),
        }
    }

    let templates_dir = resolve_path(root, &config.templates_dir);
    let template_outcomes = emit_templates(&templates_dir, &templates);

    let source_locale_path = resolve_path(root, &config.source_locale_file);
    let source_locale_outcome = emit_source_locale(&source_locale_path, session.dictionary());

    let dictionary_entries = session.dictionary().len();
    let (_, mut issues) = session.finish();
    issues.extend(parse_errors);
    issues.extend(
        template_outcomes
            .iter()
            .chain(std::iter::once(&source_locale_outcome))
            .filter_map(FileOutcome::to_issue),
    );

    Ok(ExtractReport {
        files_extracted: templates.len(),
        dictionary_entries,
        issues,
        template_outcomes,
        source_locale_outcome,
    })
}
