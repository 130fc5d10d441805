use std::path::PathBuf;

use crate::issues::Issue;

#[derive(Debug)]
pub enum CommandSummary {
    Extract(ExtractSummary),
    Populate(PopulateSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub files_extracted: usize,
    pub dictionary_entries: usize,
    pub files_written: usize,
    pub templates_dir: PathBuf,
    pub source_locale_file: PathBuf,
}

#[derive(Debug)]
pub struct PopulateSummary {
    pub templates_found: usize,
    pub locales: Vec<String>,
    pub files_written: usize,
    pub output_dir: PathBuf,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
    pub error: Option<String>,
}

/// Result of running lexis commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    /// All issues found during the run, sorted.
    pub issues: Vec<Issue>,
}
