//! tokfix-core: Token stream abstractions for tokfix
//!
//! This crate provides:
//! - `Token` / `TokenKind`: a lexical unit with a fixed kind and mutable text
//! - `Lexer`: a lossless PHP tokenizer
//! - `Tokens`: the token sequence fixers rewrite in place, with the
//!   delimiter-matching and lookahead queries they need

mod lexer;
mod token;
mod tokens;

pub use lexer::{Lexer, TokenizeError};
pub use token::{BlockType, Token, TokenKind};
pub use tokens::Tokens;
