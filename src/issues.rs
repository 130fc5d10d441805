//! Diagnostics produced while extracting or populating.
//!
//! Nothing here aborts a batch: every issue is scoped to one leaf or one
//! file and is collected for the reporter, so sibling files and leaves keep
//! being processed.

use enum_dispatch::enum_dispatch;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    Uncategorized,
    KeyCollision,
    RenderFailure,
    ParseError,
    WriteError,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::Uncategorized => write!(f, "uncategorized"),
            Rule::KeyCollision => write!(f, "key-collision"),
            Rule::RenderFailure => write!(f, "render-failure"),
            Rule::ParseError => write!(f, "parse-error"),
            Rule::WriteError => write!(f, "write-error"),
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// Text that no classification rule claimed. Left untouched in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UncategorizedIssue {
    pub file_path: String,
    /// Dictionary path the walker computed for the leaf.
    pub path: String,
    pub text: String,
    /// Why a rule that matched still could not place the text.
    pub reason: Option<String>,
}

impl UncategorizedIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::Uncategorized
    }
}

/// A dictionary path already held different text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCollisionIssue {
    pub file_path: String,
    pub path: String,
    pub existing: String,
    pub text: String,
    /// Where the new text was stored instead, if anywhere.
    pub relocated_to: Option<String>,
}

impl KeyCollisionIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::KeyCollision
    }
}

/// A placeholder that could not be evaluated. The leaf keeps its template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailureIssue {
    pub file_path: String,
    pub locale: String,
    /// Structural location of the leaf, e.g. `/3/desc/0`.
    pub location: String,
    pub template: String,
    pub error: String,
}

impl RenderFailureIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::RenderFailure
    }
}

/// Which kind of file failed to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorFileType {
    Source,
    Template,
    Locale,
}

impl std::fmt::Display for ParseErrorFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorFileType::Source => write!(f, "source"),
            ParseErrorFileType::Template => write!(f, "template"),
            ParseErrorFileType::Locale => write!(f, "locale"),
        }
    }
}

/// A file that could not be read or parsed. The file is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub error: String,
    pub file_type: ParseErrorFileType,
}

impl ParseErrorIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::ParseError
    }
}

/// An output file that could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteErrorIssue {
    pub file_path: String,
    pub error: String,
}

impl WriteErrorIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::WriteError
    }
}

// ============================================================
// Issue Enum
// ============================================================

/// A diagnostic found while extracting or populating.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    Uncategorized(UncategorizedIssue),
    KeyCollision(KeyCollisionIssue),
    RenderFailure(RenderFailureIssue),
    ParseError(ParseErrorIssue),
    WriteError(WriteErrorIssue),
}

impl Issue {
    pub fn severity(&self) -> Severity {
        match self {
            Issue::Uncategorized(_) => UncategorizedIssue::severity(),
            Issue::KeyCollision(_) => KeyCollisionIssue::severity(),
            Issue::RenderFailure(_) => RenderFailureIssue::severity(),
            Issue::ParseError(_) => ParseErrorIssue::severity(),
            Issue::WriteError(_) => WriteErrorIssue::severity(),
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Issue::Uncategorized(_) => UncategorizedIssue::rule(),
            Issue::KeyCollision(_) => KeyCollisionIssue::rule(),
            Issue::RenderFailure(_) => RenderFailureIssue::rule(),
            Issue::ParseError(_) => ParseErrorIssue::rule(),
            Issue::WriteError(_) => WriteErrorIssue::rule(),
        }
    }
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// A leaf inside a file, addressed by a dotted or slash path.
    Entry { file: &'a str, path: &'a str },
    /// File-level only.
    File { path: &'a str },
}

impl<'a> ReportLocation<'a> {
    pub fn file_path(&self) -> &'a str {
        match self {
            ReportLocation::Entry { file, .. } => *file,
            ReportLocation::File { path } => *path,
        }
    }
}

/// Trait for types that can be reported to CLI.
///
/// Implemented by all issue types; `enum_dispatch` forwards calls on `Issue`.
#[enum_dispatch]
pub trait Report {
    /// Get the location for this issue.
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    /// Severity level.
    fn report_severity(&self) -> Severity;

    /// Rule identifier.
    fn report_rule(&self) -> Rule;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for UncategorizedIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Entry {
            file: &self.file_path,
            path: &self.path,
        }
    }

    fn message(&self) -> String {
        self.text.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(
            self.reason
                .clone()
                .unwrap_or_else(|| "not caught by any classification rule".to_string()),
        )
    }
}

impl Report for KeyCollisionIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Entry {
            file: &self.file_path,
            path: &self.path,
        }
    }

    fn message(&self) -> String {
        self.text.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(match &self.relocated_to {
            Some(relocated) => format!(
                "'{}' already holds \"{}\", stored at '{}'",
                self.path, self.existing, relocated
            ),
            None => format!(
                "'{}' is blocked by \"{}\", text left in the template",
                self.path, self.existing
            ),
        })
    }
}

impl Report for RenderFailureIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Entry {
            file: &self.file_path,
            path: &self.location,
        }
    }

    fn message(&self) -> String {
        self.template.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("[{}] {}", self.locale, self.error))
    }
}

impl Report for ParseErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        format!("failed to load {} file", self.file_type)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(self.error.clone())
    }
}

impl Report for WriteErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
        }
    }

    fn message(&self) -> String {
        "failed to write file".to_string()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(self.error.clone())
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Issue {
    fn sort_key(&self) -> (&str, Severity, Rule) {
        (self.location().file_path(), self.severity(), self.rule())
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.message().cmp(&other.message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uncategorized(file: &str, text: &str) -> Issue {
        Issue::Uncategorized(UncategorizedIssue {
            file_path: file.to_string(),
            path: "spells.x".to_string(),
            text: text.to_string(),
            reason: None,
        })
    }

    #[test]
    fn test_severity_and_rule_dispatch() {
        let issue = uncategorized("a.json", "text");
        assert_eq!(issue.severity(), Severity::Warning);
        assert_eq!(issue.rule(), Rule::Uncategorized);
        assert_eq!(issue.report_rule().to_string(), "uncategorized");
        assert_eq!(
            issue.details().as_deref(),
            Some("not caught by any classification rule")
        );
    }

    #[test]
    fn test_sorting_groups_by_file_then_severity() {
        let write = Issue::WriteError(WriteErrorIssue {
            file_path: "b.json".to_string(),
            error: "denied".to_string(),
        });
        let mut issues = vec![
            uncategorized("b.json", "z"),
            write.clone(),
            uncategorized("a.json", "y"),
        ];
        issues.sort();

        assert_eq!(issues[0], uncategorized("a.json", "y"));
        assert_eq!(issues[1], write);
        assert_eq!(issues[2], uncategorized("b.json", "z"));
    }

    #[test]
    fn test_collision_details() {
        let relocated = KeyCollisionIssue {
            file_path: "a.json".to_string(),
            path: "p".to_string(),
            existing: "old".to_string(),
            text: "new".to_string(),
            relocated_to: Some("p_2".to_string()),
        };
        assert!(relocated.details().unwrap().contains("p_2"));
        assert_eq!(relocated.report_severity(), Severity::Warning);
    }
}
