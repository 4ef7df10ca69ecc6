//! Whitespace fixers
//!
//! These fixers rewrite indentation and line breaks inside whitespace and
//! comment tokens.

mod indentation;

pub use indentation::IndentationFixer;
