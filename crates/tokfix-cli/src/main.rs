//! tokfix CLI - token-based PHP whitespace fixer
//!
//! Available fixers:
//! - indentation: Re-indent code to 4 spaces per block level, no tabs
//! - remove_lines_between_uses: One import per line inside an import group

mod config;
mod fixer;
mod output;
mod process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, warn};

use config::Config;
use output::{ChangeInfo, OutputFormat, Reporter};
use process::{process_file, process_source, write_file};
use tokfix_fixer::FixerRegistry;

#[derive(Parser)]
#[command(name = "tokfix")]
#[command(version)]
#[command(about = "Token-based PHP indentation and import layout fixer")]
#[command(author = "tokfix contributors")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present_any = ["list_fixers", "stdin"])]
    paths: Vec<PathBuf>,

    /// Check for issues without applying fixes (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Apply fixes to files
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Fixers to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// Preset to run: psr2, symfony
    #[arg(long, value_name = "PRESET", conflicts_with = "rule")]
    preset: Option<String>,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .tokfix.toml)
    #[arg(long, value_name = "PATH", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available fixers and exit
    #[arg(long)]
    list_fixers: bool,

    /// Read source from stdin and write the fixed source to stdout
    #[arg(long, conflicts_with = "paths")]
    stdin: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

/// Log to stderr, filtered by `TOKFIX_LOG` (falling back to `RUST_LOG`)
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("TOKFIX_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let registry = FixerRegistry::new();

    // Handle --list-fixers
    if cli.list_fixers {
        fixer::list_fixers(&registry);
        return Ok(ExitCode::SUCCESS);
    }

    // Load config file
    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        Config::load_path(config_path)?
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                debug!(path = %path.display(), "using config file");
                cfg
            }
            None => Config::default(),
        }
    };

    // Determine output format: CLI flag, then config, then text
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        let format = cli
            .format
            .as_deref()
            .or(config.output.format.as_deref())
            .unwrap_or("text");
        OutputFormat::from_str(format).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json, diff",
                format
            )
        })?
    };

    // Validate rule names from CLI
    let all_rules = registry.names();
    for rule in &cli.rule {
        if !all_rules.contains(&rule.as_str()) {
            eprintln!(
                "{}: Unknown fixer '{}'. Use --list-fixers to see available fixers.",
                "Error".red(),
                rule
            );
            return Ok(ExitCode::from(1));
        }
    }

    let enabled_rules = config.effective_rules(&all_rules, &cli.rule, cli.preset.as_deref())?;
    for rule in &enabled_rules {
        if !all_rules.contains(&rule.as_str()) {
            warn!(rule = %rule, "ignoring unknown fixer from config");
        }
    }

    if enabled_rules.is_empty() {
        eprintln!("{}: No fixers enabled", "Error".red());
        return Ok(ExitCode::from(1));
    }

    if cli.stdin {
        return run_stdin(&registry, &enabled_rules);
    }

    // Determine mode: fix or check (check is default)
    let fix_mode = cli.fix;
    let check_mode = !fix_mode;

    if cli.verbose && output_format == OutputFormat::Text {
        let mut rules: Vec<_> = enabled_rules.iter().cloned().collect();
        rules.sort();
        println!(
            "{}: {}",
            "Mode".bold(),
            if fix_mode { "fix" } else { "check" }
        );
        println!("{}: {}", "Fixers".bold(), rules.join(", "));
        println!();
    }

    // Collect all file paths first
    let mut file_paths: Vec<PathBuf> = Vec::new();
    let mut missing_paths: Vec<PathBuf> = Vec::new();

    for path in &cli.paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && config.has_php_extension(e.path()))
            {
                let file_path = entry.path();
                if !config.should_exclude(file_path) {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    debug!(files = file_paths.len(), "collected files");

    // Process files in parallel
    let results: Vec<FileResult> = file_paths
        .par_iter()
        .map(|path| process_file_to_result(path, &registry, &enabled_rules))
        .collect();

    // Sort results by path for deterministic output
    let mut sorted_results: Vec<_> = results.into_iter().zip(file_paths.iter()).collect();
    sorted_results.sort_by(|a, b| a.1.cmp(b.1));

    let mut reporter = Reporter::new(output_format, cli.verbose);

    for path in &missing_paths {
        reporter.report_error(path, "Path does not exist");
    }

    for (result, path) in sorted_results {
        report_result(path, result, fix_mode, &mut reporter)?;
    }

    // Determine exit code
    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if check_mode && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(check_mode)?;

    Ok(exit_code)
}

/// Fix source from stdin and write it to stdout
fn run_stdin(registry: &FixerRegistry, enabled_rules: &HashSet<String>) -> Result<ExitCode> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read from stdin")?;

    let result = process_source(source, registry, enabled_rules)
        .context("Failed to tokenize stdin")?;
    let output = result.new_source.as_deref().unwrap_or(&result.old_source);

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")?;
    stdout.flush()?;

    Ok(ExitCode::SUCCESS)
}

/// Result of processing a single file (for parallel processing)
enum FileResult {
    /// File had no changes
    NoChanges,
    /// File has changes to report/apply
    HasChanges {
        changes: Vec<ChangeInfo>,
        lines_changed: usize,
        old_source: String,
        new_source: String,
    },
    /// File could not be tokenized
    TokenizeError(String),
    /// Other error occurred
    Error(String),
}

/// Process a file and return a result (no I/O, suitable for parallel execution)
fn process_file_to_result(
    path: &PathBuf,
    registry: &FixerRegistry,
    enabled_rules: &HashSet<String>,
) -> FileResult {
    match process_file(path, registry, enabled_rules) {
        Ok(Ok(result)) => match result.new_source {
            None => FileResult::NoChanges,
            Some(new_source) => FileResult::HasChanges {
                changes: result.changes,
                lines_changed: result.lines_changed,
                old_source: result.old_source,
                new_source,
            },
        },
        Ok(Err(e)) => FileResult::TokenizeError(e.to_string()),
        Err(e) => FileResult::Error(format!("{:#}", e)),
    }
}

/// Report a file result and optionally apply fixes
fn report_result(
    path: &PathBuf,
    result: FileResult,
    fix_mode: bool,
    reporter: &mut Reporter,
) -> Result<()> {
    match result {
        FileResult::NoChanges => {
            reporter.report_skipped(path);
        }
        FileResult::HasChanges {
            changes,
            lines_changed,
            old_source,
            new_source,
        } => {
            if fix_mode {
                write_file(path, &new_source)?;
                reporter.report_fix(path, changes, lines_changed);
            } else {
                reporter.report_check(path, changes, lines_changed, &old_source, &new_source);
            }
        }
        FileResult::TokenizeError(msg) => {
            reporter.report_error(path, &format!("{}, skipping", msg));
        }
        FileResult::Error(msg) => {
            reporter.report_error(path, &msg);
        }
    }
    Ok(())
}
