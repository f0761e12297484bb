//! Tokens produced by the tokenizer.

use std::fmt;

/// A location in the source, 1-based.
///
/// `column` counts UTF-8 bytes, so a multi-byte character advances it by its
/// encoded width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Create a position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position after reading `ch` at this position.
    pub(crate) fn advance(self, ch: char) -> Self {
        if ch == '\n' {
            Self {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + ch.len_utf8(),
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token kinds.
///
/// `Indent` and `Dedent` are synthetic: they come from the tokenizer's
/// indentation bookkeeping, not from literal characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Illegal,
    EndOfInput,
    Indent,
    Dedent,
    Identifier,
    Number,
    String,
    Comma,
    Colon,
    LeftBrace,
    RightBrace,
    True,
    False,
}

impl TokenKind {
    /// Upper-case name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Illegal => "ILLEGAL",
            TokenKind::EndOfInput => "EOF",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::LeftBrace => "LBRACE",
            TokenKind::RightBrace => "RBRACE",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
        }
    }

    /// Whether this kind comes from indentation rather than text.
    pub fn is_structural(self) -> bool {
        matches!(self, TokenKind::Indent | TokenKind::Dedent)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map an identifier to its keyword kind, if any.
pub fn lookup_identifier(text: &str) -> TokenKind {
    match text {
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        _ => TokenKind::Identifier,
    }
}

/// A single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Identifier text, number literal, or decoded string content.
    pub text: String,
    /// Where the token starts.
    pub position: Position,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, text: &str, position: Position) -> Self {
        Self {
            kind,
            text: text.to_string(),
            position,
        }
    }

    /// Whether the token has the given kind.
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}
