//! Normalize indentation to four spaces per nesting level

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;
use tokfix_core::{BlockType, TokenKind, Tokens};
use tracing::trace;

use crate::fixers::Fixer;

const INDENT_WIDTH: usize = 4;

/// Re-indents code to 4 spaces per block level and replaces indentation tabs
///
/// Nesting depth comes from matched block delimiters only: a block changes
/// the depth when its body spans more than one line.
pub struct IndentationFixer;

impl Fixer for IndentationFixer {
    fn name(&self) -> &'static str {
        "indentation"
    }

    fn description(&self) -> &'static str {
        "Code MUST use an indent of 4 spaces, and MUST NOT use tabs for indenting."
    }

    fn priority(&self) -> i32 {
        50
    }

    fn fix(&self, tokens: &mut Tokens) {
        convert_tabs(tokens);
        ensure_four_spaces(tokens);
    }
}

fn convert_tabs(tokens: &mut Tokens) {
    for index in 0..tokens.len() {
        let token = &tokens[index];
        if !token.text().contains('\t') {
            continue;
        }

        let fixed = if token.is_comment() {
            convert_comment_tabs(token.text())
        } else if token.is_whitespace() {
            convert_whitespace_tabs(token.text())
        } else {
            continue;
        };

        tokens.set_text(index, fixed);
    }
}

/// Replace every tab with 4 spaces, absorbing 1-3 spaces directly before it
fn convert_whitespace_tabs(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + INDENT_WIDTH);
    let mut spaces = 0usize;

    for ch in text.chars() {
        match ch {
            ' ' => spaces += 1,
            '\t' => {
                if spaces >= INDENT_WIDTH {
                    result.extend(std::iter::repeat(' ').take(spaces));
                }
                spaces = 0;
                result.push_str(&indent(1));
            }
            other => {
                result.extend(std::iter::repeat(' ').take(spaces));
                spaces = 0;
                result.push(other);
            }
        }
    }
    result.extend(std::iter::repeat(' ').take(spaces));

    result
}

/// Replace tabs in the indentation of each comment line
fn convert_comment_tabs(text: &str) -> String {
    static FIRST_TAB: OnceLock<Regex> = OnceLock::new();
    static MORE_TABS: OnceLock<Regex> = OnceLock::new();

    let first_tab = FIRST_TAB.get_or_init(|| Regex::new(r"(?m)^ {0,3}\t").unwrap());
    let more_tabs = MORE_TABS.get_or_init(|| Regex::new(r"(?m)^( *)\t").unwrap());

    let mut content = match first_tab.replace_all(text, indent(1).as_str()) {
        Cow::Borrowed(unchanged) => return unchanged.to_string(),
        Cow::Owned(replaced) => replaced,
    };

    loop {
        let next = more_tabs.replace_all(&content, "${1}    ");
        if matches!(next, Cow::Borrowed(_)) {
            break;
        }
        content = next.into_owned();
    }

    content
}

fn ensure_four_spaces(tokens: &mut Tokens) {
    let mut depth: i32 = 0;

    for index in 0..tokens.len() {
        let token = &tokens[index];

        match token.kind() {
            TokenKind::OpenTag => {
                fix_after_open_tag(tokens, index, &mut depth);
            }
            TokenKind::Open(block) => {
                if spans_lines(tokens, index, block, true) {
                    depth += 1;
                }
            }
            TokenKind::Close(block) => {
                if spans_lines(tokens, index, block, false) {
                    depth -= 1;
                }
            }
            TokenKind::Whitespace if token.has_newline() => {
                // A closer starting the line sits at its enclosing block's depth
                let line_depth = depth - closers_starting_line(tokens, index);
                let content = token.text().trim_matches(' ');
                let fixed = format!("{}{}", content, indent_for(line_depth));
                tokens.set_text(index, fixed);
            }
            TokenKind::DocComment => {
                let fixed = fix_doc_block(token.text(), &indent_for(depth));
                tokens.set_text(index, fixed);
            }
            _ => {}
        }
    }

    trace!(depth, "indentation scan finished");
}

/// Code that starts already indented right after `<?php` is treated as one
/// level deep.
fn fix_after_open_tag(tokens: &mut Tokens, index: usize, depth: &mut i32) {
    let next = index + 1;
    let Some(token) = tokens.get(next).filter(|t| t.is_whitespace()) else {
        return;
    };
    let content = token.text();

    // Any space at all counts, even a stray trailing one after the tag
    if !last_line(content).is_empty() || content.contains(' ') {
        *depth += 1;
    }

    let fixed = format!("{}{}", content.trim_end_matches(' '), indent_for(*depth));
    tokens.set_text(next, fixed);
}

/// Whether the block delimited by the token at `index` spans several lines
///
/// Walks from the matching delimiter back toward `index`. Unmatched
/// delimiters count as same-line blocks.
fn spans_lines(tokens: &Tokens, index: usize, block: BlockType, is_start: bool) -> bool {
    let Some(other) = tokens.find_block_end(block, index, is_start) else {
        return false;
    };

    if is_start {
        (index + 1..=other).rev().any(|i| tokens[i].has_newline())
    } else {
        (other..index).any(|i| tokens[i].has_newline())
    }
}

/// Number of multi-line blocks closed at the start of the line that begins
/// after the whitespace at `index`
fn closers_starting_line(tokens: &Tokens, index: usize) -> i32 {
    let mut count = 0;
    let mut next = index + 1;

    while let Some(token) = tokens.get(next) {
        let TokenKind::Close(block) = token.kind() else {
            break;
        };
        if spans_lines(tokens, next, block, false) {
            count += 1;
        }
        next += 1;
    }

    count
}

/// Text after the last line break, with CRLF and CR treated as LF
fn last_line(content: &str) -> Cow<'_, str> {
    let normalized = if content.contains('\r') {
        Cow::Owned(content.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(content)
    };

    match normalized.rfind('\n') {
        Some(position) => Cow::Owned(normalized[position + 1..].to_string()),
        None => Cow::Borrowed(""),
    }
}

/// Re-indent every line of a doc block, aligning the `*` under `/**`
fn fix_doc_block(content: &str, indent: &str) -> String {
    static LINE_START: OnceLock<Regex> = OnceLock::new();
    let line_start = LINE_START.get_or_init(|| Regex::new(r"(?m)^[ \t]*").unwrap());

    let replacement = format!("{} ", indent);
    line_start
        .replace_all(content, regex::NoExpand(&replacement))
        .trim_start()
        .to_string()
}

fn indent(levels: usize) -> String {
    " ".repeat(levels * INDENT_WIDTH)
}

fn indent_for(depth: i32) -> String {
    indent(depth.max(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(source: &str) -> String {
        let mut tokens = Tokens::from_code(source).unwrap();
        IndentationFixer.fix(&mut tokens);
        tokens.generate_code()
    }

    #[test]
    fn test_already_indented_unchanged() {
        let source = "<?php\n\nif ($a) {\n    foo();\n}\n";
        let mut tokens = Tokens::from_code(source).unwrap();
        IndentationFixer.fix(&mut tokens);
        assert!(!tokens.is_changed());
        assert_eq!(tokens.generate_code(), source);
    }

    #[test]
    fn test_reindents_nested_blocks() {
        let source = "<?php\n\nclass A\n{\n  public function f()\n  {\n        return 1;\n  }\n}\n";
        let expected = "<?php\n\nclass A\n{\n    public function f()\n    {\n        return 1;\n    }\n}\n";
        assert_eq!(fix(source), expected);
    }

    #[test]
    fn test_same_line_block_does_not_indent() {
        let source = "<?php\n\nif ($a) {\nfoo([1, 2]); bar(function () { return 1; });\nbaz();\n}\nqux();\n";
        let expected = "<?php\n\nif ($a) {\n    foo([1, 2]); bar(function () { return 1; });\n    baz();\n}\nqux();\n";
        assert_eq!(fix(source), expected);
    }

    #[test]
    fn test_multiline_call_arguments() {
        let source = "<?php\n\nfoo(\n$a,\n$b\n);\n";
        let expected = "<?php\n\nfoo(\n    $a,\n    $b\n);\n";
        assert_eq!(fix(source), expected);
    }

    #[test]
    fn test_stacked_closers_on_one_line() {
        let source = "<?php\n\nfoo(function () {\nbar();\n});\n";
        let expected = "<?php\n\nfoo(function () {\n        bar();\n});\n";
        assert_eq!(fix(source), expected);
    }

    #[test]
    fn test_tabs_to_spaces() {
        let source = "<?php\n\nif ($a) {\n\tfoo();\n}\n";
        let expected = "<?php\n\nif ($a) {\n    foo();\n}\n";
        assert_eq!(fix(source), expected);
    }

    #[test]
    fn test_inline_tab_becomes_four_spaces() {
        let source = "<?php\n\n$a =\t1;\n$b =  \t2;\n";
        let expected = "<?php\n\n$a =    1;\n$b =    2;\n";
        assert_eq!(fix(source), expected);
    }

    #[test]
    fn test_convert_whitespace_tabs() {
        assert_eq!(convert_whitespace_tabs("\t"), "    ");
        assert_eq!(convert_whitespace_tabs("\n\t\t"), "\n        ");
        assert_eq!(convert_whitespace_tabs(" \t"), "    ");
        assert_eq!(convert_whitespace_tabs("   \t"), "    ");
        assert_eq!(convert_whitespace_tabs("    \t"), "        ");
        assert_eq!(convert_whitespace_tabs("\t \t"), "        ");
        assert_eq!(convert_whitespace_tabs("\t  "), "      ");
    }

    #[test]
    fn test_convert_comment_tabs() {
        assert_eq!(convert_comment_tabs("/*\n\tfoo\n*/"), "/*\n    foo\n*/");
        assert_eq!(convert_comment_tabs("/*\n  \tfoo\n*/"), "/*\n    foo\n*/");
        assert_eq!(convert_comment_tabs("/*\n\t\t\tfoo\n*/"), "/*\n            foo\n*/");
        // Tabs after comment text are not indentation
        assert_eq!(convert_comment_tabs("/* a\tb */"), "/* a\tb */");
    }

    #[test]
    fn test_doc_block_realigned() {
        let source = "<?php\n\nclass A\n{\n    public function f()\n    {\n        /**\n   * Mixed\n*   indentation\n  */\n        return 1;\n    }\n}\n";
        let fixed = fix(source);
        assert!(fixed.contains(
            "        /**\n         * Mixed\n         *   indentation\n         */\n        return 1;"
        ));
    }

    #[test]
    fn test_close_tag_inside_block_is_indented() {
        let source = "<?php\nif ($a) {\n?>\n<p>html</p>\n<?php\n}\n";
        let expected = "<?php\nif ($a) {\n    ?>\n<p>html</p>\n<?php\n}\n";
        assert_eq!(fix(source), expected);
    }

    #[test]
    fn test_indented_first_line_after_open_tag() {
        let source = "<?php\n\n  $a = 1;\n  $b = 2;\n";
        // The whole file is one level deep, trailing line break included
        let expected = "<?php\n\n    $a = 1;\n    $b = 2;\n    ";
        assert_eq!(fix(source), expected);
    }

    #[test]
    fn test_stray_space_after_open_tag_indents_file() {
        // Known quirk: a trailing space after `<?php` counts as an indented
        // first line, so the whole file moves one level in.
        let source = "<?php  \n$a = 1;\n";
        let expected = "<?php \n    $a = 1;\n    ";
        assert_eq!(fix(source), expected);
    }

    #[test]
    fn test_unbalanced_close_does_not_panic() {
        let source = "<?php\n\n}\nfoo();\n";
        assert_eq!(fix(source), source);
    }

    #[test]
    fn test_idempotent() {
        let source = "<?php\n\nnamespace A;\n\nclass B\n{\n\t/**\n\t * Doc\n\t */\n\tpublic function c()\n\t{\n\t\tif ($d) {\n\t\t\treturn [\n\t\t\t\t1,\n\t\t\t];\n\t\t}\n\t}\n}\n";
        let once = fix(source);
        assert_eq!(fix(&once), once);
        assert!(!once.contains('\t'));
    }
}
