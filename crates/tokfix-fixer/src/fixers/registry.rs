//! Fixer registry for managing available fixers
//!
//! The registry collects all available fixers and provides methods
//! to look them up by name and apply them in priority order.

use std::collections::HashMap;
use std::sync::Arc;

use tokfix_core::{TokenizeError, Tokens};
use tracing::debug;

use super::imports::RemoveLinesBetweenUsesFixer;
use super::whitespace::IndentationFixer;
use super::Fixer;

/// Information about a registered fixer
#[derive(Debug, Clone)]
pub struct FixerInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub priority: i32,
    pub is_risky: bool,
}

/// Outcome of running fixers over one source file
#[derive(Debug, Clone)]
pub struct FixResult {
    /// Source after all fixers ran
    pub source: String,
    /// Fixers that changed at least one token, in the order they ran
    pub applied: Vec<&'static str>,
}

impl FixResult {
    pub fn is_changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Registry of all available fixers
pub struct FixerRegistry {
    fixers: Vec<Arc<dyn Fixer>>,
    by_name: HashMap<&'static str, usize>,
}

impl FixerRegistry {
    /// Create a new registry with all built-in fixers
    pub fn new() -> Self {
        let mut registry = Self {
            fixers: Vec::new(),
            by_name: HashMap::new(),
        };

        registry.register(Arc::new(IndentationFixer));
        registry.register(Arc::new(RemoveLinesBetweenUsesFixer));

        // Sort by priority (descending - higher priority runs first)
        registry.fixers.sort_by(|a, b| b.priority().cmp(&a.priority()));

        // Rebuild index after sorting
        registry.by_name.clear();
        for (idx, fixer) in registry.fixers.iter().enumerate() {
            registry.by_name.insert(fixer.name(), idx);
        }

        registry
    }

    /// Register a fixer
    fn register(&mut self, fixer: Arc<dyn Fixer>) {
        let idx = self.fixers.len();
        self.by_name.insert(fixer.name(), idx);
        self.fixers.push(fixer);
    }

    /// Get a fixer by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Fixer>> {
        self.by_name.get(name).map(|&idx| &self.fixers[idx])
    }

    /// Get all fixers in priority order
    pub fn all(&self) -> &[Arc<dyn Fixer>] {
        &self.fixers
    }

    /// Names of all fixers in priority order
    pub fn names(&self) -> Vec<&'static str> {
        self.fixers.iter().map(|f| f.name()).collect()
    }

    /// Get information about all fixers
    pub fn list(&self) -> Vec<FixerInfo> {
        self.fixers
            .iter()
            .map(|f| FixerInfo {
                name: f.name(),
                description: f.description(),
                priority: f.priority(),
                is_risky: f.is_risky(),
            })
            .collect()
    }

    /// Run the named fixers over an already tokenized file
    ///
    /// Fixers run in priority order on the same token sequence. Unknown
    /// names are ignored. Returns the names of fixers that changed something.
    pub fn fix_tokens(&self, tokens: &mut Tokens, fixer_names: &[&str]) -> Vec<&'static str> {
        let mut fixers_to_run: Vec<_> = fixer_names
            .iter()
            .filter_map(|name| self.get(name))
            .collect();

        // Sort by priority (higher priority runs first)
        fixers_to_run.sort_by(|a, b| b.priority().cmp(&a.priority()));
        fixers_to_run.dedup_by(|a, b| a.name() == b.name());

        let mut applied = Vec::new();
        for fixer in fixers_to_run {
            tokens.clear_changed();
            fixer.fix(tokens);

            if tokens.is_changed() {
                debug!(fixer = fixer.name(), "fixer changed tokens");
                applied.push(fixer.name());
            }
        }

        applied
    }

    /// Tokenize `source`, run the named fixers, and render the result
    pub fn fix(&self, source: &str, fixer_names: &[&str]) -> Result<FixResult, TokenizeError> {
        let mut tokens = Tokens::from_code(source)?;
        let applied = self.fix_tokens(&mut tokens, fixer_names);

        let source = if applied.is_empty() {
            source.to_string()
        } else {
            tokens.generate_code()
        };

        Ok(FixResult { source, applied })
    }

    /// Run every registered fixer
    pub fn fix_all(&self, source: &str) -> Result<FixResult, TokenizeError> {
        let names = self.names();
        self.fix(source, &names)
    }

    /// Number of registered fixers
    pub fn len(&self) -> usize {
        self.fixers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.fixers.is_empty()
    }
}

impl Default for FixerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::get_preset_rules;

    #[test]
    fn test_registry_has_fixers() {
        let registry = FixerRegistry::new();
        assert_eq!(registry.len(), 2);
        assert!(registry.get("indentation").is_some());
        assert!(registry.get("remove_lines_between_uses").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_priority_order() {
        let registry = FixerRegistry::new();
        let fixers = registry.all();

        for window in fixers.windows(2) {
            assert!(
                window[0].priority() >= window[1].priority(),
                "{} (priority {}) should come before {} (priority {})",
                window[0].name(),
                window[0].priority(),
                window[1].name(),
                window[1].priority()
            );
        }
        assert_eq!(registry.names(), vec!["indentation", "remove_lines_between_uses"]);
    }

    #[test]
    fn test_list_fixers() {
        let registry = FixerRegistry::new();
        for info in registry.list() {
            assert!(!info.name.is_empty());
            assert!(!info.description.is_empty());
            assert!(!info.is_risky);
        }
    }

    #[test]
    fn test_fix_reports_applied_fixers() {
        let registry = FixerRegistry::new();
        let source = "<?php\n\nuse A;\n\nuse B;\n\nif ($a) {\n\tfoo();\n}\n";

        let result = registry.fix_all(source).unwrap();

        assert_eq!(result.applied, vec!["indentation", "remove_lines_between_uses"]);
        assert_eq!(
            result.source,
            "<?php\n\nuse A;\nuse B;\n\nif ($a) {\n    foo();\n}\n"
        );
    }

    #[test]
    fn test_fix_single_fixer() {
        let registry = FixerRegistry::new();
        let source = "<?php\n\nuse A;\n\nuse B;\n\tfoo();\n";

        let result = registry.fix(source, &["remove_lines_between_uses"]).unwrap();

        assert_eq!(result.applied, vec!["remove_lines_between_uses"]);
        assert_eq!(result.source, "<?php\n\nuse A;\nuse B;\n\tfoo();\n");
    }

    #[test]
    fn test_fix_clean_source_unchanged() {
        let registry = FixerRegistry::new();
        let source = "<?php\n\nuse A;\n\nfoo();\n";

        let result = registry.fix_all(source).unwrap();

        assert!(!result.is_changed());
        assert_eq!(result.source, source);
    }

    #[test]
    fn test_fix_tokenize_error() {
        let registry = FixerRegistry::new();
        assert!(registry.fix_all("<?php\n/* open").is_err());
    }

    #[test]
    fn test_fix_preset_rules() {
        let registry = FixerRegistry::new();
        let source = "<?php\n\nuse A;\n\nuse B;\n";

        let psr2 = registry.fix(source, get_preset_rules("psr2")).unwrap();
        assert!(!psr2.is_changed());

        let symfony = registry.fix(source, get_preset_rules("@Symfony")).unwrap();
        assert_eq!(symfony.applied, vec!["remove_lines_between_uses"]);
    }
}
