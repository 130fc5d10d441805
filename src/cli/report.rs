//! Report formatting and printing utilities.
//!
//! Issues are printed in cargo style, followed by a one-line summary of what
//! the command produced. Kept apart from the engine so lexis can be used as a
//! library.

use std::io::{self, Write};

use colored::Colorize;

use super::commands::{
    CommandResult, CommandSummary, ExtractSummary, InitSummary, PopulateSummary,
};
use crate::config::CONFIG_FILE_NAME;
use crate::issues::{Issue, Report, ReportLocation, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Messages longer than this are shortened unless running verbose.
const MAX_MESSAGE_CHARS: usize = 72;

/// Print issues in cargo-style format.
///
/// Issues are expected sorted; `helper::finish` does that.
pub fn report_to<W: Write>(issues: &[Issue], verbose: bool, writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    for issue in issues {
        print_issue(issue, verbose, writer);
    }

    print_summary(issues, writer);
}

pub fn print(result: &CommandResult, verbose: bool) {
    print_to(result, verbose, &mut io::stdout().lock());
}

pub fn print_to<W: Write>(result: &CommandResult, verbose: bool, writer: &mut W) {
    report_to(&result.issues, verbose, writer);

    match &result.summary {
        CommandSummary::Extract(summary) => print_extract(summary, result.error_count, writer),
        CommandSummary::Populate(summary) => print_populate(summary, result.error_count, writer),
        CommandSummary::Init(summary) => print_init(summary, writer),
    }
}

// ============================================================
// Internal Functions
// ============================================================

fn print_issue<W: Write>(issue: &Issue, verbose: bool, writer: &mut W) {
    let severity_str = match issue.report_severity() {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let message = issue.message();
    let message = if verbose {
        message
    } else {
        shorten(&message)
    };

    let _ = writeln!(
        writer,
        "{}: \"{}\"  {}",
        severity_str,
        message,
        issue.report_rule().to_string().dimmed().cyan()
    );

    match issue.location() {
        ReportLocation::Entry { file, path } => {
            let _ = writeln!(writer, "  {} {} @ {}", "-->".blue(), file, path);
        }
        ReportLocation::File { path } => {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), path);
        }
    }

    if let Some(details) = issue.details() {
        let _ = writeln!(writer, "  {} {} {}", "=".blue(), "note:".bold(), details);
    }

    let _ = writeln!(writer); // Empty line between issues
}

fn shorten(message: &str) -> String {
    let single_line = message.replace('\n', " ");
    if single_line.chars().count() <= MAX_MESSAGE_CHARS {
        return single_line;
    }
    let head: String = single_line.chars().take(MAX_MESSAGE_CHARS).collect();
    format!("{}...", head.trim_end())
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.report_severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} problems ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        total_errors,
        if total_errors == 1 { "error" } else { "errors" }.red(),
        total_warnings,
        if total_warnings == 1 {
            "warning"
        } else {
            "warnings"
        }
        .yellow()
    );
}

fn plural(count: usize, one: &str, many: &str) -> String {
    format!("{} {}", count, if count == 1 { one } else { many })
}

fn status_mark(error_count: usize) -> colored::ColoredString {
    if error_count == 0 {
        SUCCESS_MARK.green()
    } else {
        FAILURE_MARK.red()
    }
}

fn print_extract<W: Write>(summary: &ExtractSummary, error_count: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} Extracted {} ({})",
        status_mark(error_count),
        plural(summary.files_extracted, "source file", "source files"),
        plural(
            summary.dictionary_entries,
            "dictionary entry",
            "dictionary entries"
        )
    );
    let _ = writeln!(
        writer,
        "  templates:     {}",
        summary.templates_dir.display()
    );
    let _ = writeln!(
        writer,
        "  source locale: {}",
        summary.source_locale_file.display()
    );
    let _ = writeln!(
        writer,
        "  {} written",
        plural(summary.files_written, "file", "files")
    );
}

fn print_populate<W: Write>(summary: &PopulateSummary, error_count: usize, writer: &mut W) {
    let _ = writeln!(
        writer,
        "{} Populated {} of {} for {} into {}",
        status_mark(error_count),
        summary.files_written,
        plural(summary.templates_found, "template", "templates"),
        summary.locales.join(", ").cyan(),
        summary.output_dir.display()
    );
}

fn print_init<W: Write>(summary: &InitSummary, writer: &mut W) {
    if summary.created {
        let _ = writeln!(
            writer,
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Created {}", CONFIG_FILE_NAME).green()
        );
    }
    if let Some(error) = &summary.error {
        eprintln!("{} {}", "error:".bold().red(), error);
    }
}

// ============================================================
// Tests
// ============================================================
