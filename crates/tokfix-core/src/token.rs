//! Token types shared by the lexer and the fixers

/// Kind of paired delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// `{` ... `}`
    Brace,
    /// `(` ... `)`
    Paren,
    /// `[` ... `]`
    Bracket,
    /// `#[` ... `]`
    Attribute,
}

/// Token classification
///
/// The kind is fixed when the lexer produces the token; fixers only ever
/// rewrite the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Anything outside of `<?php ... ?>`
    InlineHtml,
    /// `<?php`, including one trailing whitespace character
    OpenTag,
    /// `<?=`
    OpenTagWithEcho,
    /// `?>`, including one trailing newline
    CloseTag,
    /// Spaces, tabs and line breaks
    Whitespace,
    /// `//`, `#` or `/* */` comment
    Comment,
    /// `/** */` comment
    DocComment,
    /// `$name`
    Variable,
    /// Keywords, names and qualified names
    Identifier,
    /// `use` starting an import statement
    UseImport,
    /// `use` inside a class-like body
    UseTrait,
    /// `use` of a closure binding its variables
    UseLambda,
    /// Quoted or backtick string
    StringLiteral,
    /// Heredoc or nowdoc, label to label
    Heredoc,
    /// Integer or float literal
    Number,
    /// `;`
    Semicolon,
    /// Opening block delimiter
    Open(BlockType),
    /// Closing block delimiter
    Close(BlockType),
    /// Operators and any other punctuation
    Punct,
}

/// A single lexical unit with a fixed kind and mutable text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text, returning `true` if it actually changed
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.text = text;
        true
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Any comment, doc comments included
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::DocComment)
    }

    /// Whitespace token that breaks the line
    pub fn has_newline(&self) -> bool {
        self.is_whitespace() && self.text.bytes().any(|b| b == b'\n' || b == b'\r')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_text_reports_change() {
        let mut token = Token::new(TokenKind::Whitespace, "\n");
        assert!(!token.set_text("\n"));
        assert!(token.set_text("\n    "));
        assert_eq!(token.text(), "\n    ");
    }

    #[test]
    fn test_has_newline_only_for_whitespace() {
        assert!(Token::new(TokenKind::Whitespace, " \n ").has_newline());
        assert!(Token::new(TokenKind::Whitespace, "\r").has_newline());
        assert!(!Token::new(TokenKind::Whitespace, "    ").has_newline());
        assert!(!Token::new(TokenKind::Comment, "/*\n*/").has_newline());
    }
}
