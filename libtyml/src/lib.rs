//! TYML ("tiny YAML") parser implementation.
//!
//! TYML is an indentation-sensitive document format with a deliberately
//! small grammar: nested objects written as `key: value` pairs with two
//! spaces of indentation per level, quoted strings and decimal numbers.
//!
//! ```text
//! server:
//!   host: "example.org"
//!   port: 8080
//! name: 'demo'
//! ```
//!
//! # Parsing Pipeline
//!
//! 1. **Tokenizer**: Reads characters and produces tokens, synthesizing
//!    `Indent`/`Dedent` tokens from leading spaces. Records the first
//!    lexical error and keeps going.
//!
//! 2. **Parser**: Pulls tokens on demand and builds the `Value` tree,
//!    tracking its own nesting depth to decide where objects end.
//!    Accumulates syntax errors; a token that cannot start a value aborts.

mod error;
mod parser;
mod token;
mod tokenizer;
mod value;

pub use error::{LexError, ParseContext, ParseError, ParseErrors, Result, SyntaxError};
pub use parser::Parser;
pub use token::{lookup_identifier, Position, Token, TokenKind};
pub use tokenizer::Tokenizer;
pub use value::{Identifier, Key, Node, NumberValue, ObjectValue, Pair, StringValue, Value};

use std::io::Read;

/// Parse a TYML document from a string.
///
/// # Example
///
/// ```
/// use libtyml::parse;
///
/// let value = parse("answer: 42").unwrap();
/// let answer = value.as_object().and_then(|o| o.get("answer"));
/// assert_eq!(answer.and_then(|v| v.as_number()), Some("42"));
/// ```
pub fn parse(input: &str) -> Result<Value> {
    parse_with_filename(input, None)
}

/// Parse a TYML document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Value> {
    let ctx = ParseContext::new(filename);
    Parser::new(Tokenizer::new(input.as_bytes())).parse_document(&ctx)
}

/// Parse a TYML document from any reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Value> {
    let ctx = ParseContext::default();
    Parser::new(Tokenizer::new(reader)).parse_document(&ctx)
}
