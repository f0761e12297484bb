//! Error types for TYML parsing.
//!
//! Lexical and syntax errors are kept apart: the tokenizer records only its
//! first `LexError`, while the parser accumulates every `SyntaxError`. The
//! two meet in `ParseError` at the public entry points.

use crate::token::{Position, TokenKind};
use std::fmt;
use thiserror::Error;

/// Result type for TYML parsing operations.
pub type Result<T> = std::result::Result<T, ParseErrors>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a filename suffix for error messages.
    pub fn file_suffix(&self) -> String {
        match &self.filename {
            Some(name) => format!(" of <{}>", name),
            None => String::new(),
        }
    }
}

/// Error recorded by the tokenizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// End of input before the closing quote.
    #[error("Unterminated string at {0}")]
    UnterminatedString(Position),

    /// Backslash followed by an unsupported character.
    #[error("Bad escaped character {0:?} at {1}")]
    BadEscapedChar(char, Position),

    /// Raw control character inside a string.
    #[error("Control character in string at {0}")]
    ControlCharInString(Position),

    /// A `0` followed by another digit.
    #[error("Unexpected leading zero at {0}")]
    LeadingZero(Position),

    /// A `.` not followed by a digit.
    #[error("Expected digits after decimal point at {0}")]
    ExpectedFractionDigits(Position),

    /// An exponent marker not followed by a digit.
    #[error("Expected digits in exponent at {0}")]
    ExpectedExponentDigits(Position),

    /// Tab character found where spaces expected.
    #[error("Tab not allowed (use spaces) at {0}")]
    TabNotAllowed(Position),

    /// Character that cannot start any token.
    #[error("Unexpected character {0:?} at {1}")]
    UnexpectedChar(char, Position),

    /// Byte sequence that is not UTF-8.
    #[error("Invalid UTF-8 at {0}")]
    InvalidUtf8(Position),

    /// The underlying reader failed.
    #[error("Read error at {1}: {0}")]
    Read(String, Position),
}

impl LexError {
    /// Where the error was detected.
    pub fn position(&self) -> Position {
        match self {
            LexError::UnterminatedString(p)
            | LexError::BadEscapedChar(_, p)
            | LexError::ControlCharInString(p)
            | LexError::LeadingZero(p)
            | LexError::ExpectedFractionDigits(p)
            | LexError::ExpectedExponentDigits(p)
            | LexError::TabNotAllowed(p)
            | LexError::UnexpectedChar(_, p)
            | LexError::InvalidUtf8(p)
            | LexError::Read(_, p) => *p,
        }
    }
}

/// Error produced by the parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A specific token was required and another was found.
    #[error("Expected {expected}, found {found} at {position}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        position: Position,
    },

    /// A value on the line after its key is not exactly one level deeper.
    #[error("Expected indentation depth {expected}, found {found} at {position}")]
    Indentation {
        expected: usize,
        found: usize,
        position: Position,
    },

    /// A token that cannot begin a value. Fatal: aborts the whole parse.
    #[error("No value can start with {found} at {position}")]
    NoValueStart { found: TokenKind, position: Position },
}

impl SyntaxError {
    /// Where the error was detected.
    pub fn position(&self) -> Position {
        match self {
            SyntaxError::UnexpectedToken { position, .. }
            | SyntaxError::Indentation { position, .. }
            | SyntaxError::NoValueStart { position, .. } => *position,
        }
    }

    /// Whether this error aborts the parse.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SyntaxError::NoValueStart { .. })
    }
}

/// Either kind of error, as reported by the entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    /// Where the error was detected.
    pub fn position(&self) -> Position {
        match self {
            ParseError::Lex(e) => e.position(),
            ParseError::Syntax(e) => e.position(),
        }
    }
}

/// Non-empty, ordered list of errors from one parse.
#[derive(Debug, Clone)]
pub struct ParseErrors {
    errors: Vec<ParseError>,
    ctx: ParseContext,
}

impl ParseErrors {
    /// Build from a list that the caller guarantees is non-empty.
    pub(crate) fn new(errors: Vec<ParseError>, ctx: &ParseContext) -> Self {
        debug_assert!(!errors.is_empty());
        Self {
            errors,
            ctx: ctx.clone(),
        }
    }

    /// The first error.
    pub fn first(&self) -> &ParseError {
        &self.errors[0]
    }

    /// All errors in order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParseError> {
        self.errors.iter()
    }

    /// The filename the errors refer to, if known.
    pub fn filename(&self) -> Option<&str> {
        self.ctx.filename.as_deref()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.first(), self.ctx.file_suffix())?;
        match self.errors.len() {
            1 => Ok(()),
            2 => write!(f, " (and 1 more error)"),
            n => write!(f, " (and {} more errors)", n - 1),
        }
    }
}

impl std::error::Error for ParseErrors {}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ParseError;
    type IntoIter = std::slice::Iter<'a, ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
