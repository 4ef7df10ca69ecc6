//! Output formatting for tokfix
//!
//! Supports text (colored terminal), JSON and unified diff output formats.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// A fixer that changed a file
#[derive(Debug, Clone, Serialize)]
pub struct ChangeInfo {
    pub rule: String,
    pub message: String,
}

/// Per-file entry of the JSON report
#[derive(Debug, Clone, Serialize)]
struct FileReport {
    path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    changes: Vec<ChangeInfo>,
    #[serde(skip_serializing_if = "is_zero")]
    lines_changed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl FileReport {
    fn changed(path: &Path, changes: Vec<ChangeInfo>, lines_changed: usize) -> Self {
        Self {
            path: path.display().to_string(),
            changes,
            lines_changed,
            error: None,
        }
    }

    fn clean(path: &Path) -> Self {
        Self::changed(path, Vec::new(), 0)
    }

    fn failed(path: &Path, error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::clean(path)
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_changes: usize,
    pub total_fixes: usize,
    pub errors: usize,
}

impl Summary {
    fn record(&mut self, report: &FileReport) {
        self.files_processed += 1;
        if report.error.is_some() {
            self.errors += 1;
        }
        if !report.changes.is_empty() {
            self.files_with_changes += 1;
            self.total_fixes += report.changes.len();
        }
    }

    fn print(&self, check_mode: bool) {
        println!();
        println!("{}", "Summary".bold().underline());
        println!("  Files processed: {}", self.files_processed);
        println!("  Files with changes: {}", self.files_with_changes);
        println!("  Fixers applied: {}", self.total_fixes);
        if self.errors > 0 {
            println!("  Errors: {}", self.errors);
        }

        if check_mode && self.files_with_changes > 0 {
            println!();
            println!("{}", "Run with --fix to apply changes".yellow());
        }
    }
}

#[derive(Serialize)]
struct JsonReport {
    version: &'static str,
    summary: Summary,
    files: Vec<FileReport>,
}

/// Collects per-file outcomes and prints them in the selected format
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    files: Vec<FileReport>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            files: Vec::new(),
            summary: Summary::default(),
        }
    }

    fn push(&mut self, report: FileReport) {
        self.summary.record(&report);
        self.files.push(report);
    }

    /// Report a file that would change (check mode)
    pub fn report_check(
        &mut self,
        path: &Path,
        changes: Vec<ChangeInfo>,
        lines_changed: usize,
        old_source: &str,
        new_source: &str,
    ) {
        match self.format {
            OutputFormat::Text => {
                println!("{}", path.display().to_string().bold());
                print_changed_lines(old_source, new_source);
                println!();
                for change in &changes {
                    println!("  {} {} ({})", "->".green(), change.rule, change.message);
                }
                println!();
            }
            OutputFormat::Diff => print_unified_diff(path, old_source, new_source),
            OutputFormat::Json => {}
        }

        self.push(FileReport::changed(path, changes, lines_changed));
    }

    /// Report a file that was rewritten (fix mode)
    pub fn report_fix(&mut self, path: &Path, changes: Vec<ChangeInfo>, lines_changed: usize) {
        if self.format == OutputFormat::Text {
            let rules: Vec<&str> = changes.iter().map(|c| c.rule.as_str()).collect();
            println!("{}", path.display().to_string().bold());
            println!(
                "  {} Fixed {} line(s) with {}",
                "OK".green(),
                lines_changed,
                rules.join(", ")
            );
            println!();
        }

        self.push(FileReport::changed(path, changes, lines_changed));
    }

    pub fn report_skipped(&mut self, path: &Path) {
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: No changes needed", path.display());
        }
        self.push(FileReport::clean(path));
    }

    /// Errors go to stderr so they never mix into json or diff output
    pub fn report_error(&mut self, path: &Path, error: &str) {
        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }
        self.push(FileReport::failed(path, error));
    }

    pub fn finish(self, check_mode: bool) -> Result<()> {
        match self.format {
            OutputFormat::Text => self.summary.print(check_mode),
            OutputFormat::Json => {
                let report = JsonReport {
                    version: env!("CARGO_PKG_VERSION"),
                    summary: self.summary,
                    files: self.files,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            // Patch-compatible output has no trailer
            OutputFormat::Diff => {}
        }

        Ok(())
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// A removed or added line with its 1-based line number in its own version
#[derive(Debug, PartialEq, Eq)]
enum LineChange<'a> {
    Removed(usize, &'a str),
    Added(usize, &'a str),
}

fn changed_lines<'a>(old: &'a str, new: &'a str) -> Vec<LineChange<'a>> {
    let (mut old_line, mut new_line) = (0, 0);
    let mut changes = Vec::new();

    for result in diff::lines(old, new) {
        match result {
            diff::Result::Left(l) => {
                old_line += 1;
                changes.push(LineChange::Removed(old_line, l));
            }
            diff::Result::Right(r) => {
                new_line += 1;
                changes.push(LineChange::Added(new_line, r));
            }
            diff::Result::Both(_, _) => {
                old_line += 1;
                new_line += 1;
            }
        }
    }

    changes
}

fn print_changed_lines(old: &str, new: &str) {
    for change in changed_lines(old, new) {
        match change {
            LineChange::Removed(line, text) => {
                let text = format!("- {}", visible_whitespace(text));
                println!("  {:>5} {}", line, text.red());
            }
            LineChange::Added(line, text) => {
                let text = format!("+ {}", visible_whitespace(text));
                println!("  {:>5} {}", line, text.green());
            }
        }
    }
}

/// Show leading indentation as `·` (space) and `→` (tab)
fn visible_whitespace(line: &str) -> String {
    let body = line.trim_start_matches([' ', '\t']);
    let indent = &line[..line.len() - body.len()];
    let marked: String = indent
        .chars()
        .map(|c| if c == '\t' { '→' } else { '·' })
        .collect();
    format!("{}{}", marked, body)
}

/// Print a `diff -u` compatible patch for one file
fn print_unified_diff(path: &Path, old: &str, new: &str) {
    use similar::{ChangeTag, TextDiff};

    let diff = TextDiff::from_lines(old, new);
    let path_str = path.display().to_string();

    println!("--- a/{}", path_str);
    println!("+++ b/{}", path_str);

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        println!("{}", hunk.header());
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            print!("{}{}", sign, change);
            if change.missing_newline() {
                println!();
            }
        }
    }
}
