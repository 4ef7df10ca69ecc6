//! File processing logic for tokfix

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use tokfix_core::TokenizeError;
use tokfix_fixer::FixerRegistry;

use crate::output::ChangeInfo;

/// Result of processing a single file
pub struct ProcessResult {
    /// Fixers that changed the file, in the order they ran
    pub changes: Vec<ChangeInfo>,
    /// Lines of the original file that were rewritten
    pub lines_changed: usize,
    /// Original source code
    pub old_source: String,
    /// New source code (only if some fixer changed the file)
    pub new_source: Option<String>,
}

/// Run the enabled fixers over source text
pub fn process_source(
    source_code: String,
    registry: &FixerRegistry,
    enabled_rules: &HashSet<String>,
) -> Result<ProcessResult, TokenizeError> {
    let names: Vec<&str> = enabled_rules.iter().map(String::as_str).collect();
    let result = registry.fix(&source_code, &names)?;

    if !result.is_changed() {
        return Ok(ProcessResult {
            changes: vec![],
            lines_changed: 0,
            old_source: source_code,
            new_source: None,
        });
    }

    let changes = result
        .applied
        .iter()
        .map(|&name| ChangeInfo {
            rule: name.to_string(),
            message: registry
                .get(name)
                .map(|fixer| fixer.description().to_string())
                .unwrap_or_default(),
        })
        .collect();

    Ok(ProcessResult {
        changes,
        lines_changed: count_changed_lines(&source_code, &result.source),
        old_source: source_code,
        new_source: Some(result.source),
    })
}

/// Process a single PHP file
///
/// Returns `Ok(Err(_))` when the file cannot be tokenized, so callers can
/// report it and keep going.
pub fn process_file(
    path: &Path,
    registry: &FixerRegistry,
    enabled_rules: &HashSet<String>,
) -> Result<Result<ProcessResult, TokenizeError>> {
    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    debug!(path = %path.display(), bytes = source_code.len(), "processing file");

    Ok(process_source(source_code, registry, enabled_rules))
}

/// Write the processed result to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Number of lines removed or rewritten between two versions of a file
fn count_changed_lines(old: &str, new: &str) -> usize {
    diff::lines(old, new)
        .into_iter()
        .filter(|line| matches!(line, diff::Result::Left(_)))
        .count()
}
