//! tokfix-fixer: token-based PHP whitespace fixers
//!
//! This crate provides formatting fixers that rewrite the whitespace and
//! comment tokens of a [`tokfix_core::Tokens`] sequence in place:
//!
//! - `indentation`: 4-space indentation derived from multi-line blocks
//! - `remove_lines_between_uses`: one import per line inside an import group
//!
//! Fixers run in priority order through the [`FixerRegistry`].
//!
//! # Example
//!
//! ```
//! use tokfix_fixer::FixerRegistry;
//!
//! let registry = FixerRegistry::new();
//! let result = registry.fix_all("<?php\nif ($a) {\n\tfoo();\n}\n").unwrap();
//! assert_eq!(result.source, "<?php\nif ($a) {\n    foo();\n}\n");
//! ```

pub mod config;
pub mod fixers;

pub use config::{get_preset_rules, Preset};
pub use fixers::{FixResult, Fixer, FixerInfo, FixerRegistry};
