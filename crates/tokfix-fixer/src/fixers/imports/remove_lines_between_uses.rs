//! Remove blank lines between consecutive use imports

use std::sync::OnceLock;

use regex::Regex;
use tokfix_core::{TokenKind, Tokens};
use tracing::debug;

use crate::fixers::Fixer;

/// Compacts each group of adjacent `use` imports to one statement per line
///
/// Blank lines before and after a group are kept.
pub struct RemoveLinesBetweenUsesFixer;

impl Fixer for RemoveLinesBetweenUsesFixer {
    fn name(&self) -> &'static str {
        "remove_lines_between_uses"
    }

    fn description(&self) -> &'static str {
        "Removes line breaks between use statements."
    }

    fn priority(&self) -> i32 {
        // Must run before any fixer that sorts imports
        -5
    }

    fn fix(&self, tokens: &mut Tokens) {
        let imports = tokens.import_use_indexes();
        if imports.is_empty() {
            return;
        }

        let groups = import_groups(tokens, &imports);
        debug!(imports = imports.len(), groups = groups.len(), "compacting import groups");

        for group in &groups {
            fix_line_breaks_per_import_group(tokens, group);
        }
    }
}

/// Split import keyword indexes into runs where each import's `;` is
/// followed (whitespace aside) by the next import's keyword
fn import_groups(tokens: &Tokens, imports: &[usize]) -> Vec<Vec<usize>> {
    let mut groups = Vec::new();
    let mut current: Vec<usize> = Vec::new();

    for &index in imports {
        if let Some(&previous) = current.last() {
            if next_statement_start(tokens, previous) != Some(index) {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(index);
    }

    if !current.is_empty() {
        groups.push(current);
    }

    groups
}

/// First non-whitespace token after the statement starting at `index`
fn next_statement_start(tokens: &Tokens, index: usize) -> Option<usize> {
    let end = tokens.next_token_of_kind(index, &[TokenKind::Semicolon])?;
    tokens.next_non_whitespace(end)
}

/// Walk the group bottom-up; the last import is followed by other code and
/// is left alone.
fn fix_line_breaks_per_import_group(tokens: &mut Tokens, group: &[usize]) {
    for &index in group.iter().rev().skip(1) {
        let Some(end) = tokens.next_token_of_kind(index, &[TokenKind::Semicolon]) else {
            continue;
        };

        let follows_import = tokens
            .next_non_whitespace(end)
            .is_some_and(|after| tokens[after].kind() == TokenKind::UseImport);
        if !follows_import {
            continue;
        }

        let next = end + 1;
        if let Some(token) = tokens.get(next).filter(|t| t.is_whitespace()) {
            let fixed = collapse_line_breaks(token.text());
            tokens.set_text(next, fixed);
        }
    }
}

fn collapse_line_breaks(content: &str) -> String {
    static LINE_BREAKS: OnceLock<Regex> = OnceLock::new();
    let line_breaks = LINE_BREAKS.get_or_init(|| Regex::new(r"\n{2,}").unwrap());

    line_breaks.replace_all(content, "\n").into_owned()
}
