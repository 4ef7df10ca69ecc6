//! Lossless PHP lexer
//!
//! Every byte of the input ends up in exactly one token, so concatenating the
//! token texts reproduces the source.

use thiserror::Error;

use crate::token::{BlockType, Token, TokenKind};

/// Errors that can occur while tokenizing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("Unterminated comment starting on line {line}")]
    UnterminatedComment { line: usize },

    #[error("Unterminated string starting on line {line}")]
    UnterminatedString { line: usize },

    #[error("Unterminated heredoc starting on line {line}")]
    UnterminatedHeredoc { line: usize },
}

/// An open delimiter waiting for its closer
#[derive(Debug, Clone, Copy)]
struct Frame {
    block: BlockType,
    namespace_body: bool,
}

pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    position: usize,
    in_php: bool,
    frames: Vec<Frame>,
    pending_namespace: bool,
    last_significant: Option<(TokenKind, &'a str)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            position: 0,
            in_php: false,
            frames: Vec::new(),
            pending_namespace: false,
            last_significant: None,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, TokenizeError> {
        let input = self.input;
        let mut tokens = Vec::new();

        while let Some(byte) = self.peek() {
            let start = self.position;
            let kind = if self.in_php {
                self.next_php_token(byte)?
            } else {
                self.next_html_token()
            };
            let text = &input[start..self.position];

            if !matches!(
                kind,
                TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
            ) {
                self.last_significant = Some((kind, text));
            }
            tokens.push(Token::new(kind, text));
        }

        Ok(tokens)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.position + offset).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.input[self.position..].starts_with(pattern)
    }

    fn eat_while(&mut self, predicate: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&predicate) {
            self.position += 1;
        }
    }

    /// Skip a single line break (`\r\n` counts as one)
    fn eat_newline(&mut self) {
        if self.starts_with("\r\n") {
            self.position += 2;
        } else if matches!(self.peek(), Some(b'\n') | Some(b'\r')) {
            self.position += 1;
        }
    }

    fn line_at(&self, offset: usize) -> usize {
        self.input[..offset].matches('\n').count() + 1
    }

    fn next_html_token(&mut self) -> TokenKind {
        let rest = &self.input[self.position..];

        match find_open_tag(rest) {
            Some(0) => {
                self.in_php = true;
                if self.starts_with("<?=") {
                    self.position += 3;
                    return TokenKind::OpenTagWithEcho;
                }
                self.position += 5;
                if matches!(self.peek(), Some(b' ') | Some(b'\t')) {
                    self.position += 1;
                } else {
                    self.eat_newline();
                }
                TokenKind::OpenTag
            }
            Some(offset) => {
                self.position += offset;
                TokenKind::InlineHtml
            }
            None => {
                self.position = self.input.len();
                TokenKind::InlineHtml
            }
        }
    }

    fn next_php_token(&mut self, byte: u8) -> Result<TokenKind, TokenizeError> {
        let start = self.position;

        let kind = match byte {
            b' ' | b'\t' | b'\n' | b'\r' => {
                self.eat_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
                TokenKind::Whitespace
            }
            b'?' if self.peek_at(1) == Some(b'>') => {
                self.position += 2;
                self.eat_newline();
                self.in_php = false;
                TokenKind::CloseTag
            }
            b'#' if self.peek_at(1) == Some(b'[') => {
                self.position += 2;
                self.open_block(BlockType::Attribute)
            }
            b'#' => {
                self.skip_line_comment();
                TokenKind::Comment
            }
            b'/' if self.peek_at(1) == Some(b'/') => {
                self.skip_line_comment();
                TokenKind::Comment
            }
            b'/' if self.peek_at(1) == Some(b'*') => self.read_block_comment(start)?,
            b'\'' | b'"' | b'`' => {
                self.read_quoted(byte, start)?;
                TokenKind::StringLiteral
            }
            b'<' if self.starts_with("<<<") => {
                if self.read_heredoc(start)? {
                    TokenKind::Heredoc
                } else {
                    self.position += 1;
                    TokenKind::Punct
                }
            }
            b'$' if self.peek_at(1).is_some_and(is_ident_start) => {
                self.position += 1;
                self.eat_while(is_ident_char);
                TokenKind::Variable
            }
            b'0'..=b'9' => {
                self.read_number();
                TokenKind::Number
            }
            b'.' if self.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => {
                self.read_number();
                TokenKind::Number
            }
            b if is_ident_start(b) => {
                self.eat_while(is_ident_char);
                let input = self.input;
                self.classify_word(&input[start..self.position])
            }
            b';' => {
                self.position += 1;
                self.pending_namespace = false;
                TokenKind::Semicolon
            }
            b'{' => {
                self.position += 1;
                self.open_block(BlockType::Brace)
            }
            b'(' => {
                self.position += 1;
                self.open_block(BlockType::Paren)
            }
            b'[' => {
                self.position += 1;
                self.open_block(BlockType::Bracket)
            }
            b'}' => {
                self.position += 1;
                self.close_block(BlockType::Brace)
            }
            b')' => {
                self.position += 1;
                self.close_block(BlockType::Paren)
            }
            b']' => {
                self.position += 1;
                self.close_block(BlockType::Bracket)
            }
            _ => {
                let len = self.input[self.position..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
                self.position += len;
                TokenKind::Punct
            }
        };

        Ok(kind)
    }

    fn open_block(&mut self, block: BlockType) -> TokenKind {
        let namespace_body = block == BlockType::Brace && self.pending_namespace;
        if block == BlockType::Brace {
            self.pending_namespace = false;
        }
        self.frames.push(Frame {
            block,
            namespace_body,
        });
        TokenKind::Open(block)
    }

    fn close_block(&mut self, block: BlockType) -> TokenKind {
        // `]` closes an attribute when one is the innermost open block
        let block = match self.frames.last() {
            Some(frame) if block == BlockType::Bracket && frame.block == BlockType::Attribute => {
                BlockType::Attribute
            }
            _ => block,
        };

        if self.frames.last().is_some_and(|frame| frame.block == block) {
            self.frames.pop();
        }

        TokenKind::Close(block)
    }

    fn classify_word(&mut self, word: &str) -> TokenKind {
        let after_member_access = matches!(self.last_significant, Some((_, ">")) | Some((_, ":")));

        if word.eq_ignore_ascii_case("use") && !after_member_access {
            return self.classify_use();
        }
        if word.eq_ignore_ascii_case("namespace") && !after_member_access {
            self.pending_namespace = true;
        }

        TokenKind::Identifier
    }

    fn classify_use(&self) -> TokenKind {
        if matches!(
            self.last_significant,
            Some((TokenKind::Close(BlockType::Paren), _))
        ) {
            return TokenKind::UseLambda;
        }

        match self.frames.iter().rev().find(|frame| frame.block == BlockType::Brace) {
            Some(frame) if !frame.namespace_body => TokenKind::UseTrait,
            _ => TokenKind::UseImport,
        }
    }

    /// Consume a `//` or `#` comment, stopping before the line break or `?>`
    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' || b == b'\r' || (b == b'?' && self.peek_at(1) == Some(b'>')) {
                break;
            }
            self.position += 1;
        }
    }

    fn read_block_comment(&mut self, start: usize) -> Result<TokenKind, TokenizeError> {
        let is_doc = self.starts_with("/**") && self.peek_at(3).is_some_and(|b| b.is_ascii_whitespace());

        match self.input[self.position + 2..].find("*/") {
            Some(offset) => {
                self.position += 2 + offset + 2;
                Ok(if is_doc {
                    TokenKind::DocComment
                } else {
                    TokenKind::Comment
                })
            }
            None => Err(TokenizeError::UnterminatedComment {
                line: self.line_at(start),
            }),
        }
    }

    fn read_quoted(&mut self, quote: u8, start: usize) -> Result<(), TokenizeError> {
        let interpolates = quote != b'\'';
        // Opening quote
        self.position += 1;

        while let Some(b) = self.peek() {
            if b == b'\\' {
                self.position += 1;
                if self.peek().is_some() {
                    self.position += 1;
                }
            } else if b == quote {
                self.position += 1;
                return Ok(());
            } else if interpolates && (self.starts_with("{$") || self.starts_with("${")) {
                self.position += 2;
                self.read_interpolation(start)?;
            } else {
                self.position += 1;
            }
        }

        Err(TokenizeError::UnterminatedString {
            line: self.line_at(start),
        })
    }

    /// Skip a `{$...}` or `${...}` expression up to its closing brace.
    /// Quotes inside it start nested strings rather than ending the outer one.
    fn read_interpolation(&mut self, start: usize) -> Result<(), TokenizeError> {
        let mut depth = 1usize;

        while let Some(b) = self.peek() {
            match b {
                b'\'' | b'"' | b'`' => self.read_quoted(b, start)?,
                b'{' => {
                    self.position += 1;
                    depth += 1;
                }
                b'}' => {
                    self.position += 1;
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => self.position += 1,
            }
        }

        Err(TokenizeError::UnterminatedString {
            line: self.line_at(start),
        })
    }

    /// Read a heredoc or nowdoc. Returns `false` if `<<<` does not start one.
    fn read_heredoc(&mut self, start: usize) -> Result<bool, TokenizeError> {
        let rest = &self.input[self.position + 3..];
        let header = rest.trim_start_matches([' ', '\t']);

        let (quote, body) = match header.as_bytes().first() {
            Some(b'\'') => (Some('\''), &header[1..]),
            Some(b'"') => (Some('"'), &header[1..]),
            _ => (None, header),
        };

        if !body.as_bytes().first().is_some_and(|&b| is_ident_start(b) && b != b'\\') {
            return Ok(false);
        }
        let label_len = body
            .bytes()
            .take_while(|&b| is_ident_char(b) && b != b'\\')
            .count();
        let label = &body[..label_len];

        let mut after = &body[label_len..];
        if let Some(quote) = quote {
            match after.strip_prefix(quote) {
                Some(remaining) => after = remaining,
                None => return Ok(false),
            }
        }

        let newline_len = if after.starts_with("\r\n") {
            2
        } else if after.starts_with('\n') || after.starts_with('\r') {
            1
        } else {
            return Ok(false);
        };

        // Closing label: first line whose content starts with the label and
        // is not followed by another label character
        let mut line_start = self.input.len() - after.len() + newline_len;
        loop {
            let line = &self.input[line_start..];
            let content = line.trim_start_matches([' ', '\t']);
            let terminated = content.starts_with(label)
                && !content
                    .as_bytes()
                    .get(label.len())
                    .is_some_and(|&b| is_ident_char(b));

            if terminated {
                self.position = self.input.len() - content.len() + label.len();
                return Ok(true);
            }

            match line.find('\n') {
                Some(offset) => line_start += offset + 1,
                None => {
                    return Err(TokenizeError::UnterminatedHeredoc {
                        line: self.line_at(start),
                    })
                }
            }
        }
    }

    fn read_number(&mut self) {
        self.position += 1;
        while let Some(b) = self.peek() {
            let decimal_point = b == b'.' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit());
            if b.is_ascii_alphanumeric() || b == b'_' || decimal_point {
                self.position += 1;
            } else {
                break;
            }
        }
    }
}

/// Offset of the first `<?php` or `<?=` tag in `text`
fn find_open_tag(text: &str) -> Option<usize> {
    text.match_indices("<?").map(|(index, _)| index).find(|&index| {
        let candidate = &text[index..];
        if candidate.starts_with("<?=") {
            return true;
        }
        candidate.len() >= 5
            && candidate.as_bytes()[..5].eq_ignore_ascii_case(b"<?php")
            && candidate
                .as_bytes()
                .get(5)
                .map_or(true, |b| b.is_ascii_whitespace())
    })
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'\\' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
