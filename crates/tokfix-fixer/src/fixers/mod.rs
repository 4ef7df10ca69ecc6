//! Fixer implementations
//!
//! Each fixer rewrites the text of whitespace-like tokens in a [`Tokens`]
//! sequence in place. Fixers never add or remove tokens.

mod registry;
pub mod whitespace;
pub mod imports;

pub use registry::{FixResult, FixerInfo, FixerRegistry};

use tokfix_core::Tokens;

/// A formatting fixer that rewrites a token sequence in place
pub trait Fixer: Send + Sync {
    /// Rule name used on the command line and in config files
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Execution priority (higher = runs first)
    ///
    /// Indentation runs early at 50; import layout fixers run below zero so
    /// they see imports before any sorting happens.
    fn priority(&self) -> i32;

    /// Whether this fixer makes risky changes
    fn is_risky(&self) -> bool {
        false
    }

    /// Apply the fixer to a token sequence
    fn fix(&self, tokens: &mut Tokens);
}
