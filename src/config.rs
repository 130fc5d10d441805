use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{Context, Ok, Result};
use glob::Pattern;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = ".lexisrc.json";

/// Conjunctions seeded into the source locale and used to rejoin lists.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Delimiters {
    #[serde(default = "default_and")]
    pub and: String,
    #[serde(default = "default_and_with_oxford_comma")]
    pub and_with_oxford_comma: String,
}

fn default_and() -> String {
    " and ".to_string()
}

fn default_and_with_oxford_comma() -> String {
    ", and ".to_string()
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            and: default_and(),
            and_with_oxford_comma: default_and_with_oxford_comma(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding the source data files.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
    /// Only files starting with this prefix are source files; the rest of
    /// the file name names the domain.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Files whose name contains one of these markers are extracted last.
    #[serde(default = "default_deferred_files")]
    pub deferred_files: Vec<String>,
    /// Glob patterns (matched against file names) excluded from extraction.
    #[serde(default)]
    pub ignores: Vec<String>,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    #[serde(default = "default_source_locale_file")]
    pub source_locale_file: String,
    /// Locale id of the source locale file.
    #[serde(default = "default_source_locale")]
    pub source_locale: String,
    /// Optional directory of `<locale>.json` dictionaries used for population.
    /// When unset, population uses the source locale file alone.
    #[serde(default)]
    pub locales_dir: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub delimiters: Delimiters,
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn default_file_prefix() -> String {
    "5e-SRD-".to_string()
}

fn default_deferred_files() -> Vec<String> {
    ["Monsters", "Traits"].map(String::from).to_vec()
}

fn default_templates_dir() -> String {
    "multilingual-support/templates".to_string()
}

fn default_source_locale_file() -> String {
    "multilingual-support/source-locale.json".to_string()
}

fn default_source_locale() -> String {
    "en".to_string()
}

fn default_output_dir() -> String {
    "multilingual-support/output".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            file_prefix: default_file_prefix(),
            deferred_files: default_deferred_files(),
            ignores: Vec::new(),
            templates_dir: default_templates_dir(),
            source_locale_file: default_source_locale_file(),
            source_locale: default_source_locale(),
            locales_dir: None,
            output_dir: default_output_dir(),
            delimiters: Delimiters::default(),
        }
    }
}

impl Config {
    /// Validate configuration values.
    ///
    /// Returns an error if any glob pattern in `ignores` is invalid or the
    /// source locale id is empty.
    pub fn validate(&self) -> Result<()> {
        for pattern in &self.ignores {
            Pattern::new(pattern)
                .with_context(|| format!("Invalid glob pattern in 'ignores': \"{}\"", pattern))?;
        }

        if self.source_locale.trim().is_empty() {
            anyhow::bail!("'sourceLocale' must not be empty");
        }

        Ok(())
    }

    /// Compiled `ignores` patterns. Call after `validate`.
    pub fn ignore_patterns(&self) -> Vec<Pattern> {
        self.ignores
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect()
    }
}

/// Resolves a configured path against the project root.
///
/// Absolute paths are kept; when the root is the current directory the
/// path is used as-is so reported paths stay short.
pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        return p.to_path_buf();
    }

    let is_cur_dir = root.components().all(|c| matches!(c, Component::CurDir));
    if is_cur_dir {
        p.to_path_buf()
    } else {
        let rel = p.strip_prefix(Path::new(".")).unwrap_or(p);
        root.join(rel)
    }
}

pub fn default_config_json() -> Result<String> {
    let config = Config::default();
    serde_json::to_string_pretty(&config).context("Failed to generate default config.")
}

/// Looks for the config file in `start_dir` and its ancestors, stopping at
/// the repository root (a directory holding `.git`).
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir
        .canonicalize()
        .unwrap_or_else(|_| start_dir.to_path_buf());

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
pub struct ConfigLoadResult {
    pub config: Config,
    /// True if config was loaded from a file, false if using defaults.
    pub from_file: bool,
}

pub fn load_config(start_dir: &Path) -> Result<ConfigLoadResult> {
    match find_config_file(start_dir) {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            config.validate()?;
            Ok(ConfigLoadResult {
                config,
                from_file: true,
            })
        }
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            from_file: false,
        }),
    }
}
