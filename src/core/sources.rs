//! Discovery of source, template and locale files.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use colored::Colorize;
use glob::Pattern;
use walkdir::WalkDir;

/// A source data file and the domain it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub file_name: String,
    pub domain: String,
}

/// Result of scanning a directory.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<PathBuf>,
    pub skipped_count: usize,
}

fn is_json_file(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json")
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

/// Fails unless `dir` is an existing directory. `setting` names the config
/// field that points at it.
fn ensure_dir(dir: &Path, label: &str, setting: &str) -> Result<()> {
    if !dir.exists() {
        bail!(
            "{} directory '{}' does not exist.\n\
             Hint: Check your .lexisrc.json '{}' setting.",
            label,
            dir.display(),
            setting
        );
    }
    if !dir.is_dir() {
        bail!("'{}' is not a directory.", dir.display());
    }
    Ok(())
}

/// Lists `.json` files directly inside `dir`, sorted by name.
///
/// Unreadable entries are counted in `skipped_count` rather than failing
/// the scan.
pub fn scan_json_files(dir: &Path, verbose: bool) -> ScanResult {
    let mut result = ScanResult::default();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                result.skipped_count += 1;
                if verbose {
                    eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                }
                continue;
            }
        };

        if is_json_file(entry.path()) {
            result.files.push(entry.into_path());
        }
    }

    result.files.sort();
    result
}

fn warn_skipped(scan: &ScanResult, verbose: bool) {
    if scan.skipped_count > 0 {
        eprintln!(
            "{} {} path(s) skipped due to access errors{}",
            "warning:".bold().yellow(),
            scan.skipped_count,
            if verbose { "" } else { " (use -v for details)" }
        );
    }
}

/// Source files in `source_dir`: names starting with `prefix` and not
/// matching any ignore pattern. Fails when none are found.
pub fn scan_source_files(
    source_dir: &Path,
    prefix: &str,
    ignores: &[Pattern],
    verbose: bool,
) -> Result<Vec<SourceFile>> {
    ensure_dir(source_dir, "Source", "sourceDir")?;
    let scan = scan_json_files(source_dir, verbose);
    warn_skipped(&scan, verbose);

    let files: Vec<SourceFile> = scan
        .files
        .into_iter()
        .filter_map(|path| {
            let name = file_name(&path)?.to_string();
            if !name.starts_with(prefix) || ignores.iter().any(|p| p.matches(&name)) {
                return None;
            }
            Some(SourceFile {
                domain: derive_domain(&name, prefix),
                file_name: name,
                path,
            })
        })
        .collect();

    if files.is_empty() {
        bail!(
            "No source files starting with '{}' found in '{}'.",
            prefix,
            source_dir.display()
        );
    }

    Ok(files)
}

/// Domain name of a source file.
///
/// ```
/// use lexis::core::sources::derive_domain;
///
/// assert_eq!(derive_domain("5e-SRD-Ability-Scores.json", "5e-SRD-"), "ability_scores");
/// ```
pub fn derive_domain(file_name: &str, prefix: &str) -> String {
    let stem = file_name.strip_prefix(prefix).unwrap_or(file_name);
    let stem = stem.strip_suffix(".json").unwrap_or(stem);
    stem.replace('-', "_").to_lowercase()
}

/// Orders files by name, moving those whose name contains a deferred marker
/// to the end. Relative order inside each group is kept.
pub fn order_source_files(mut files: Vec<SourceFile>, deferred: &[String]) -> Vec<SourceFile> {
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    let is_deferred = |file: &SourceFile| deferred.iter().any(|m| file.file_name.contains(m.as_str()));
    let (mut primary, later): (Vec<_>, Vec<_>) = files.into_iter().partition(|f| !is_deferred(f));
    primary.extend(later);
    primary
}

/// Locale id of a locale file: its file stem.
pub fn extract_locale(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

/// `(locale, path)` for every `.json` file in `locales_dir`, sorted by locale.
pub fn scan_locale_files(locales_dir: &Path, verbose: bool) -> Result<Vec<(String, PathBuf)>> {
    ensure_dir(locales_dir, "Locales", "localesDir")?;
    let scan = scan_json_files(locales_dir, verbose);
    warn_skipped(&scan, verbose);

    let mut locales: Vec<(String, PathBuf)> = scan
        .files
        .into_iter()
        .filter_map(|path| extract_locale(&path).map(|locale| (locale, path)))
        .collect();
    locales.sort_by(|a, b| a.0.cmp(&b.0));

    if locales.is_empty() {
        bail!("No locale files found in '{}'.", locales_dir.display());
    }

    Ok(locales)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn source(name: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from(name),
            file_name: name.to_string(),
            domain: derive_domain(name, "5e-SRD-"),
        }
    }

    #[test]
    fn test_derive_domain() {
        assert_eq!(derive_domain("5e-SRD-Spells.json", "5e-SRD-"), "spells");
        assert_eq!(derive_domain("5e-SRD-Magic-Items.json", "5e-SRD-"), "magic_items");
        assert_eq!(derive_domain("Other.json", "5e-SRD-"), "other");
    }

    #[test]
    fn test_order_defers_marked_files() {
        let files = vec![
            source("5e-SRD-Traits.json"),
            source("5e-SRD-Spells.json"),
            source("5e-SRD-Monsters.json"),
            source("5e-SRD-Classes.json"),
        ];
        let ordered = order_source_files(files, &["Monsters".to_string(), "Traits".to_string()]);
        let names: Vec<_> = ordered.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "5e-SRD-Classes.json",
                "5e-SRD-Spells.json",
                "5e-SRD-Monsters.json",
                "5e-SRD-Traits.json",
            ]
        );
    }

    #[test]
    fn test_scan_source_files_filters_prefix_and_ignores() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("5e-SRD-Spells.json"), "[]").unwrap();
        fs::write(dir.path().join("5e-SRD-Spells-Backup.json"), "[]").unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();
        fs::write(dir.path().join("5e-SRD-Readme.md"), "").unwrap();

        let ignores = vec![Pattern::new("*Backup*").unwrap()];
        let files = scan_source_files(dir.path(), "5e-SRD-", &ignores, false).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "5e-SRD-Spells.json");
        assert_eq!(files[0].domain, "spells");
    }

    #[test]
    fn test_scan_source_files_missing_dir() {
        let dir = tempdir().unwrap();
        let err = scan_source_files(&dir.path().join("nope"), "5e-SRD-", &[], false).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
        assert!(err.to_string().contains("sourceDir"));
    }

    #[test]
    fn test_scan_source_files_none_found() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("other.json"), "[]").unwrap();
        let err = scan_source_files(dir.path(), "5e-SRD-", &[], false).unwrap_err();
        assert!(err.to_string().contains("No source files"));
    }

    #[test]
    fn test_extract_locale() {
        assert_eq!(extract_locale(Path::new("en.json")), Some("en".to_string()));
        assert_eq!(
            extract_locale(Path::new("/path/to/locales/pt-BR.json")),
            Some("pt-BR".to_string())
        );
    }

    #[test]
    fn test_scan_locale_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("pt.json"), "{}").unwrap();
        fs::write(dir.path().join("en.json"), "{}").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let locales = scan_locale_files(dir.path(), false).unwrap();
        let ids: Vec<_> = locales.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["en", "pt"]);
    }
}
