//! Value Parser
//!
//! Recursive descent over the token stream with one token of lookahead.
//! The parser keeps its own `depth`, moved by every `Indent` and `Dedent` it
//! consumes. An object keeps collecting pairs while `depth` is back at the
//! depth the object started at; any other depth after a pair ends it.

use crate::error::{ParseContext, ParseError, ParseErrors, Result, SyntaxError};
use crate::token::{Token, TokenKind};
use crate::tokenizer::Tokenizer;
use crate::value::{Identifier, Key, ObjectValue, Pair, Value};
use std::io::Read;
use tracing::{debug, trace};

/// Single-pass parser pulling tokens from a `Tokenizer`.
pub struct Parser<R: Read> {
    tokenizer: Tokenizer<R>,
    current: Token,
    peek: Token,
    depth: usize,
    errors: Vec<SyntaxError>,
}

impl<R: Read> Parser<R> {
    /// Create a parser and fill its lookahead.
    pub fn new(mut tokenizer: Tokenizer<R>) -> Self {
        let current = tokenizer.next_token();
        let peek = tokenizer.next_token();
        trace!(kind = %current.kind, position = %current.position, "token");
        trace!(kind = %peek.kind, position = %peek.position, "token");
        Self {
            tokenizer,
            current,
            peek,
            depth: 0,
            errors: Vec::new(),
        }
    }

    /// Syntax errors recorded so far, in order.
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// The underlying tokenizer, for its lexical error.
    pub fn tokenizer(&self) -> &Tokenizer<R> {
        &self.tokenizer
    }

    /// Current logical nesting depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Parse one value.
    ///
    /// `Err` is fatal: a token that can never start a value. `Ok(None)`
    /// means a subtree failed and the reasons are in `errors()`.
    pub fn parse(&mut self) -> std::result::Result<Option<Value>, SyntaxError> {
        self.parse_value(0)
    }

    /// Parse a whole document: one value followed only by the end of input.
    ///
    /// Collects the tokenizer's error first, then every syntax error in
    /// order, then the fatal error if the parse was aborted.
    pub fn parse_document(mut self, ctx: &ParseContext) -> Result<Value> {
        let (value, fatal) = match self.parse() {
            Ok(value) => (value, None),
            Err(e) => (None, Some(e)),
        };
        if value.is_some() {
            self.expect_end();
        }

        let mut errors: Vec<ParseError> = Vec::new();
        if let Some(e) = self.tokenizer.take_error() {
            errors.push(e.into());
        }
        errors.extend(self.errors.into_iter().map(ParseError::from));
        errors.extend(fatal.map(ParseError::from));

        match value {
            Some(value) if errors.is_empty() => Ok(value),
            _ => Err(ParseErrors::new(errors, ctx)),
        }
    }

    // ========================================================================
    // Values
    // ========================================================================

    fn parse_value(
        &mut self,
        mut target: usize,
    ) -> std::result::Result<Option<Value>, SyntaxError> {
        if self.current.kind.is_structural() {
            while self.current.kind.is_structural() {
                self.consume_structural();
            }
            // Indentation in front of the document sets the depth its
            // pairs live at
            target = self.depth;
        }

        match self.current.kind {
            TokenKind::Identifier => self.parse_object(target),
            TokenKind::String => Ok(Some(Value::String(self.current.clone().into()))),
            TokenKind::Number => Ok(Some(Value::Number(self.current.clone().into()))),
            found => {
                let error = SyntaxError::NoValueStart {
                    found,
                    position: self.current.position,
                };
                debug!(%error, "fatal syntax error");
                Err(error)
            }
        }
    }

    /// Parse a value that starts on the line after its key. The indentation
    /// in front of it must put it exactly at `target`.
    fn parse_block_value(
        &mut self,
        target: usize,
    ) -> std::result::Result<Option<Value>, SyntaxError> {
        while self.current.kind.is_structural() {
            self.consume_structural();
        }
        let starts_value = matches!(
            self.current.kind,
            TokenKind::Identifier | TokenKind::String | TokenKind::Number
        );
        if starts_value && self.depth != target {
            self.push_error(SyntaxError::Indentation {
                expected: target,
                found: self.depth,
                position: self.current.position,
            });
            return Ok(None);
        }
        self.parse_value(target)
    }

    /// Parse pairs starting at the current identifier until the depth moves
    /// away from `target` or the input ends.
    fn parse_object(&mut self, target: usize) -> std::result::Result<Option<Value>, SyntaxError> {
        let mut pairs = Vec::new();
        let mut identifier = Identifier::from(self.current.clone());

        loop {
            if !self.expect_peek(TokenKind::Colon) {
                return Ok(None);
            }
            let colon_line = self.current.position.line;
            self.next_token();

            // A key's value is always one level deeper than the key
            let value_target = self.depth + 1;
            let value = if self.current.position.line > colon_line {
                self.parse_block_value(value_target)?
            } else {
                self.parse_value(value_target)?
            };
            let Some(value) = value else {
                return Ok(None);
            };
            pairs.push(Pair {
                key: Key { identifier },
                value,
            });

            self.drain_structural();
            if self.depth != target || self.peek.is(TokenKind::EndOfInput) {
                break;
            }
            if !self.expect_peek(TokenKind::Identifier) {
                return Ok(None);
            }
            identifier = Identifier::from(self.current.clone());
        }

        Ok(Some(Value::Object(ObjectValue { pairs })))
    }

    // ========================================================================
    // Token handling
    // ========================================================================

    fn next_token(&mut self) {
        let next = self.tokenizer.next_token();
        trace!(kind = %next.kind, position = %next.position, "token");
        self.current = std::mem::replace(&mut self.peek, next);
    }

    /// Consume the current `Indent`/`Dedent` and move `depth` with it.
    fn consume_structural(&mut self) {
        match self.current.kind {
            TokenKind::Indent => self.depth += 1,
            TokenKind::Dedent => self.depth = self.depth.saturating_sub(1),
            _ => return,
        }
        self.next_token();
    }

    /// Absorb the `Dedent`s and `Indent`s after a value. A whitespace-only
    /// line shows up here as `Indent` followed by `Dedent`.
    fn drain_structural(&mut self) {
        loop {
            match self.peek.kind {
                TokenKind::Dedent => {
                    self.next_token();
                    self.depth = self.depth.saturating_sub(1);
                }
                TokenKind::Indent => {
                    self.next_token();
                    self.depth += 1;
                }
                _ => break,
            }
        }
    }

    /// After the root value only indentation may remain.
    fn expect_end(&mut self) {
        while self.peek.kind.is_structural() {
            self.next_token();
        }
        if !self.peek.is(TokenKind::EndOfInput) {
            self.peek_error(TokenKind::EndOfInput);
        }
    }

    fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek.is(kind) {
            self.next_token();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    fn peek_error(&mut self, expected: TokenKind) {
        self.push_error(SyntaxError::UnexpectedToken {
            expected,
            found: self.peek.kind,
            position: self.peek.position,
        });
    }

    fn push_error(&mut self, error: SyntaxError) {
        debug!(%error, "syntax error");
        self.errors.push(error);
    }
}
