//! End-to-end tests for the built-in fixers
//!
//! Each test tokenizes a complete PHP file, runs fixers through the public
//! API and checks the rendered output.

use tokfix_core::{TokenKind, Tokens};
use tokfix_fixer::fixers::imports::RemoveLinesBetweenUsesFixer;
use tokfix_fixer::fixers::whitespace::IndentationFixer;
use tokfix_fixer::{Fixer, FixerRegistry};

fn apply(fixer: &dyn Fixer, source: &str) -> String {
    let mut tokens = Tokens::from_code(source).unwrap();
    fixer.fix(&mut tokens);
    tokens.generate_code()
}

const MESSY: &str = "<?php\n\nnamespace App;\n\nuse A;\n\n\nuse B;\n\nclass C\n{\n\tpublic function f($x)\n  {\n\t\tif ($x) { return [1, 2]; }\n\n\t\treturn foo(\n\t\t\t$x,\n\t\t\t2\n\t\t);\n\t}\n}\n";

#[test]
fn test_indentation_is_idempotent() {
    let once = apply(&IndentationFixer, MESSY);
    let twice = apply(&IndentationFixer, &once);
    assert_eq!(once, twice);

    let mut tokens = Tokens::from_code(&once).unwrap();
    IndentationFixer.fix(&mut tokens);
    assert!(!tokens.is_changed());
}

#[test]
fn test_indentation_removes_indentation_tabs() {
    let inputs = [
        MESSY,
        "<?php\n\t\t$a = 1;\n",
        "<?php\nif ($a) {\n \t/*\n\t * note\n\t\t */\n\tfoo();\n}\n",
        "<?php\nif ($a) {\n\t/**\n\t * Doc\n\t */\n\tfoo();\n}\n",
    ];

    for input in inputs {
        let mut tokens = Tokens::from_code(input).unwrap();
        IndentationFixer.fix(&mut tokens);

        for token in &tokens {
            if token.is_whitespace() || token.is_comment() {
                assert!(
                    !token.text().contains('\t'),
                    "tab left in {:?} for input {:?}",
                    token.text(),
                    input
                );
            }
        }
    }
}

#[test]
fn test_indentation_canonical_nesting() {
    let source = "<?php\n\nif ($a) {\n  $b = [1, 2];\n      foo($b);\n}\n  $c = 1;\n";
    let expected = "<?php\n\nif ($a) {\n    $b = [1, 2];\n    foo($b);\n}\n$c = 1;\n";
    assert_eq!(apply(&IndentationFixer, source), expected);
}

#[test]
fn test_indentation_full_file() {
    let expected = "<?php\n\nnamespace App;\n\nuse A;\n\n\nuse B;\n\nclass C\n{\n    public function f($x)\n    {\n        if ($x) { return [1, 2]; }\n\n        return foo(\n            $x,\n            2\n        );\n    }\n}\n";
    assert_eq!(apply(&IndentationFixer, MESSY), expected);
}

#[test]
fn test_doc_comment_realigned_at_depth_two() {
    let source = "<?php\n\nclass A\n{\n    public function f()\n    {\n/**\n* Doc\n   *   more\n\t*/\n        $a = 1;\n    }\n}\n";
    let expected = "<?php\n\nclass A\n{\n    public function f()\n    {\n        /**\n         * Doc\n         *   more\n         */\n        $a = 1;\n    }\n}\n";

    let fixed = apply(&IndentationFixer, source);
    assert_eq!(fixed, expected);

    let doc_lines: Vec<_> = fixed
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("/**"))
        .skip(1)
        .take(3)
        .collect();
    for line in doc_lines {
        assert!(line.starts_with("         *"), "misaligned line {:?}", line);
    }
}

#[test]
fn test_import_group_compacted() {
    let source = "<?php\n\nnamespace App;\n\nuse A;\n\n\nuse B;\n\nuse C;\n\nclass D\n{\n}\n";
    let expected = "<?php\n\nnamespace App;\n\nuse A;\nuse B;\nuse C;\n\nclass D\n{\n}\n";
    assert_eq!(apply(&RemoveLinesBetweenUsesFixer, source), expected);
}

#[test]
fn test_import_group_boundary() {
    let source = "<?php\n\nuse A;\n\n$x = 1;\n\nuse B;\n";
    assert_eq!(apply(&RemoveLinesBetweenUsesFixer, source), source);
}

#[test]
fn test_untouched_tokens_round_trip() {
    let source = "<?php\n\n$a   =  'x\ty';\n\tfoo( $a ); # keep\t\n$s = <<<EOT\n\tbody\nEOT;\n";
    let original = Tokens::from_code(source).unwrap();

    let mut tokens = original.clone();
    IndentationFixer.fix(&mut tokens);
    RemoveLinesBetweenUsesFixer.fix(&mut tokens);

    assert_eq!(tokens.len(), original.len());
    for (before, after) in original.iter().zip(tokens.iter()) {
        assert_eq!(before.kind(), after.kind());
        if !matches!(before.kind(), TokenKind::Whitespace | TokenKind::DocComment) {
            assert_eq!(before.text(), after.text());
        }
    }

    assert_eq!(
        tokens.generate_code(),
        "<?php\n\n$a   =  'x\ty';\nfoo( $a ); # keep\t\n$s = <<<EOT\n\tbody\nEOT;\n"
    );
}

#[test]
fn test_registry_runs_fixers_in_priority_order() {
    let indentation = IndentationFixer;
    let imports = RemoveLinesBetweenUsesFixer;
    assert!(indentation.priority() > imports.priority());
    assert!(imports.priority() < 0);

    let registry = FixerRegistry::new();
    let result = registry.fix_all(MESSY).unwrap();

    assert_eq!(result.applied, vec!["indentation", "remove_lines_between_uses"]);
    assert!(result.source.contains("use A;\nuse B;\n\nclass C\n{\n    public function f($x)\n"));
}

#[test]
fn test_open_tag_with_stray_spaces_indents_whole_file() {
    // The open tag takes one space; any space left in the following
    // whitespace raises the base depth
    let source = "<?php  \n$a = 1;\n";
    assert_eq!(apply(&IndentationFixer, source), "<?php \n    $a = 1;\n    ");
}

#[test]
fn test_open_tag_with_single_space_keeps_depth() {
    let source = "<?php \n$a = 1;\n";
    assert_eq!(apply(&IndentationFixer, source), source);
}
