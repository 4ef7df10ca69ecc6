//! Indexable token sequence that fixers rewrite in place

use std::ops::Index;

use crate::lexer::{Lexer, TokenizeError};
use crate::token::{BlockType, Token, TokenKind};

/// Ordered token sequence for a single source file
///
/// The number of tokens never changes after construction; fixers only
/// rewrite token text through [`Tokens::set_text`], which also records
/// whether anything actually changed.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
    tokens: Vec<Token>,
    changed: bool,
}

impl Tokens {
    /// Tokenize PHP source code
    pub fn from_code(source: &str) -> Result<Self, TokenizeError> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self::from_vec(tokens))
    }

    pub fn from_vec(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            changed: false,
        }
    }

    /// Render the sequence back to source code
    pub fn generate_code(&self) -> String {
        let capacity = self.tokens.iter().map(|t| t.text().len()).sum();
        let mut code = String::with_capacity(capacity);
        for token in &self.tokens {
            code.push_str(token.text());
        }
        code
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Rewrite the text of the token at `index`
    ///
    /// Returns `true` if the text changed. Out-of-range indexes are ignored.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> bool {
        let changed = self
            .tokens
            .get_mut(index)
            .is_some_and(|token| token.set_text(text));
        self.changed |= changed;
        changed
    }

    /// Whether any token text changed since construction or the last
    /// [`Tokens::clear_changed`]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn clear_changed(&mut self) {
        self.changed = false;
    }

    /// Find the matching delimiter of the block delimiter at `index`
    ///
    /// Searches forward from an opener (`is_start`) or backward from a closer.
    /// Returns `None` when the token at `index` is not the expected delimiter
    /// or the block is unbalanced.
    pub fn find_block_end(&self, block: BlockType, index: usize, is_start: bool) -> Option<usize> {
        let open = TokenKind::Open(block);
        let close = TokenKind::Close(block);
        let expected = if is_start { open } else { close };
        if self.tokens.get(index)?.kind() != expected {
            return None;
        }

        let mut depth = 0usize;
        if is_start {
            for (i, token) in self.tokens.iter().enumerate().skip(index) {
                if token.kind() == open {
                    depth += 1;
                } else if token.kind() == close {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
            }
        } else {
            for i in (0..=index).rev() {
                let kind = self.tokens[i].kind();
                if kind == close {
                    depth += 1;
                } else if kind == open {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
            }
        }

        None
    }

    /// Index of the first token after `index` whose kind is one of `kinds`
    pub fn next_token_of_kind(&self, index: usize, kinds: &[TokenKind]) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, token)| kinds.contains(&token.kind()))
            .map(|(i, _)| i)
    }

    /// Index of the first non-whitespace token after `index`
    ///
    /// Comments count as non-whitespace.
    pub fn next_non_whitespace(&self, index: usize) -> Option<usize> {
        self.tokens
            .iter()
            .enumerate()
            .skip(index + 1)
            .find(|(_, token)| !token.is_whitespace())
            .map(|(i, _)| i)
    }

    /// Indexes of every `use` keyword that starts an import statement
    pub fn import_use_indexes(&self) -> Vec<usize> {
        self.tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.kind() == TokenKind::UseImport)
            .map(|(i, _)| i)
            .collect()
    }
}

impl Index<usize> for Tokens {
    type Output = Token;

    fn index(&self, index: usize) -> &Token {
        &self.tokens[index]
    }
}

impl<'a> IntoIterator for &'a Tokens {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
