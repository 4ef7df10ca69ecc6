//! Import statement fixers
//!
//! These fixers handle the layout of `use` import groups.

mod remove_lines_between_uses;

pub use remove_lines_between_uses::RemoveLinesBetweenUsesFixer;
