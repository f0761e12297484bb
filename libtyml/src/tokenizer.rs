//! Tokenizer
//!
//! Converts a character stream into tokens. Whitespace is significant only
//! at the start of a line: each pair of leading spaces opens one indent level
//! and emits an `Indent` token. Every newline (and the end of input) unwinds
//! all open levels again, one `Dedent` token per call, so the parser sees a
//! line's depth as the `Dedent`s and `Indent`s in front of it.
//!
//! The tokenizer never fails outright. It records the first lexical error,
//! returns an `Illegal` token for the offending scan and keeps going.

use crate::error::LexError;
use crate::token::{lookup_identifier, Position, Token, TokenKind};
use std::io::{BufReader, Bytes, Read};
use tracing::debug;

/// Pull-based tokenizer over any reader.
pub struct Tokenizer<R: Read> {
    input: Bytes<BufReader<R>>,
    /// One character of lookahead. `Some(None)` means end of input.
    peeked: Option<Option<char>>,
    exhausted: bool,
    /// Position of the next unread character.
    position: Position,
    buffer: String,
    indent_level: usize,
    pending_dedent: bool,
    /// Only spaces seen so far on the current line.
    at_line_start: bool,
    finished: bool,
    error: Option<LexError>,
}

impl<R: Read> Tokenizer<R> {
    /// Create a tokenizer reading UTF-8 text from `input`.
    pub fn new(input: R) -> Self {
        Self {
            input: BufReader::new(input).bytes(),
            peeked: None,
            exhausted: false,
            position: Position::default(),
            buffer: String::new(),
            indent_level: 0,
            pending_dedent: false,
            at_line_start: true,
            finished: false,
            error: None,
        }
    }

    /// The first lexical error, if any was recorded.
    pub fn error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }

    /// Take the recorded lexical error, leaving none behind.
    pub fn take_error(&mut self) -> Option<LexError> {
        self.error.take()
    }

    /// Number of currently open indent levels.
    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    /// Position of the next unread character.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Produce the next token. Returns `EndOfInput` forever once the input
    /// and all open indent levels are exhausted.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.buffer.clear();

            if self.pending_dedent {
                if self.indent_level > 0 {
                    self.indent_level -= 1;
                    return self.token(TokenKind::Dedent, self.position);
                }
                self.pending_dedent = false;
            }

            let start = self.position;
            let Some(ch) = self.peek() else {
                // End of input closes the last line like a newline would
                if self.indent_level > 0 {
                    self.pending_dedent = true;
                    continue;
                }
                return self.token(TokenKind::EndOfInput, start);
            };

            match ch {
                '\n' => {
                    self.skip();
                    self.pending_dedent = true;
                    self.at_line_start = true;
                }
                ' ' => {
                    self.bump();
                    if self.at_line_start && self.peek() == Some(' ') {
                        self.bump();
                        self.indent_level += 1;
                        return self.token(TokenKind::Indent, start);
                    }
                }
                '\r' => {
                    self.skip();
                }
                _ => {
                    self.at_line_start = false;
                    return self.scan_token(ch, start);
                }
            }
        }
    }

    /// Scan a token that starts with a non-whitespace character.
    fn scan_token(&mut self, ch: char, start: Position) -> Token {
        let kind = match ch {
            '"' | '\'' => {
                self.skip();
                self.read_string(ch, start)
            }
            ':' => {
                self.bump();
                self.skip_horizontal_whitespace();
                TokenKind::Colon
            }
            ',' => {
                self.bump();
                TokenKind::Comma
            }
            '{' => {
                self.bump();
                TokenKind::LeftBrace
            }
            '}' => {
                self.bump();
                TokenKind::RightBrace
            }
            '\t' => {
                self.bump();
                self.record(LexError::TabNotAllowed(start));
                TokenKind::Illegal
            }
            c if is_identifier_start(c) => {
                self.bump();
                self.read_identifier();
                lookup_identifier(&self.buffer)
            }
            c if c.is_ascii_digit() => {
                self.bump();
                self.read_number(c)
            }
            c => {
                self.bump();
                self.record(LexError::UnexpectedChar(c, start));
                TokenKind::Illegal
            }
        };
        self.token(kind, start)
    }

    fn read_identifier(&mut self) {
        while self.peek().is_some_and(char::is_alphabetic) {
            self.bump();
        }
    }

    /// Scan the rest of a number whose first digit has been consumed.
    fn read_number(&mut self, first: char) -> TokenKind {
        if first == '0' && self.peek_is_digit() {
            self.record(LexError::LeadingZero(self.position));
            self.read_digits();
            return TokenKind::Illegal;
        }
        self.read_digits();

        if self.peek() == Some('.') {
            self.bump();
            if !self.peek_is_digit() {
                self.record(LexError::ExpectedFractionDigits(self.position));
                return TokenKind::Illegal;
            }
            self.read_digits();
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            if !self.peek_is_digit() {
                self.record(LexError::ExpectedExponentDigits(self.position));
                return TokenKind::Illegal;
            }
            self.read_digits();
        }

        TokenKind::Number
    }

    fn read_digits(&mut self) {
        while self.peek_is_digit() {
            self.bump();
        }
    }

    fn peek_is_digit(&mut self) -> bool {
        self.peek().is_some_and(|c| c.is_ascii_digit())
    }

    /// Scan string content after the opening `quote`, decoding escapes into
    /// the buffer.
    fn read_string(&mut self, quote: char, start: Position) -> TokenKind {
        loop {
            let here = self.position;
            match self.peek() {
                None => {
                    self.record(LexError::UnterminatedString(start));
                    return TokenKind::Illegal;
                }
                Some(c) if c == quote => {
                    self.skip();
                    return TokenKind::String;
                }
                Some('\\') => {
                    self.skip();
                    let escaped_at = self.position;
                    let decoded = match self.peek() {
                        Some(c) if c == quote => quote,
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some(c) => {
                            self.record(LexError::BadEscapedChar(c, escaped_at));
                            return TokenKind::Illegal;
                        }
                        None => {
                            self.record(LexError::UnterminatedString(start));
                            return TokenKind::Illegal;
                        }
                    };
                    self.skip();
                    self.buffer.push(decoded);
                }
                Some(c) if c.is_control() => {
                    self.record(LexError::ControlCharInString(here));
                    return TokenKind::Illegal;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Skip spaces and other horizontal whitespace, stopping at a newline.
    fn skip_horizontal_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace() && c != '\n') {
            self.skip();
        }
    }

    fn token(&self, kind: TokenKind, position: Position) -> Token {
        Token::new(kind, &self.buffer, position)
    }

    fn record(&mut self, error: LexError) {
        if self.error.is_none() {
            debug!(%error, "lexical error");
            self.error = Some(error);
        }
    }

    // ------------------------------------------------------------------------
    // Character stream
    // ------------------------------------------------------------------------

    fn peek(&mut self) -> Option<char> {
        if self.peeked.is_none() {
            let next = self.read_char();
            self.peeked = Some(next);
        }
        self.peeked.flatten()
    }

    /// Consume the next character without buffering it.
    fn skip(&mut self) -> Option<char> {
        let next = self.peek();
        if let Some(ch) = next {
            self.peeked = None;
            self.position = self.position.advance(ch);
        }
        next
    }

    /// Consume the next character into the token buffer.
    fn bump(&mut self) -> Option<char> {
        let next = self.skip();
        if let Some(ch) = next {
            self.buffer.push(ch);
        }
        next
    }

    /// Decode one UTF-8 character from the input.
    fn read_char(&mut self) -> Option<char> {
        let lead = self.read_byte()?;
        let width = utf8_width(lead);
        let mut bytes = [lead, 0, 0, 0];
        for slot in bytes.iter_mut().take(width).skip(1) {
            match self.read_byte() {
                Some(b) => *slot = b,
                None => {
                    self.record(LexError::InvalidUtf8(self.position));
                    return Some(char::REPLACEMENT_CHARACTER);
                }
            }
        }
        match std::str::from_utf8(&bytes[..width]) {
            Ok(s) => s.chars().next(),
            Err(_) => {
                self.record(LexError::InvalidUtf8(self.position));
                Some(char::REPLACEMENT_CHARACTER)
            }
        }
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.exhausted {
            return None;
        }
        match self.input.next() {
            Some(Ok(b)) => Some(b),
            Some(Err(e)) => {
                self.record(LexError::Read(e.to_string(), self.position));
                self.exhausted = true;
                None
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

impl<R: Read> Iterator for Tokenizer<R> {
    type Item = Token;

    /// Yields every token up to and including the first `EndOfInput`.
    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        if token.is(TokenKind::EndOfInput) {
            self.finished = true;
        }
        Some(token)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Encoded width of a UTF-8 sequence from its lead byte.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use TokenKind::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input.as_bytes()).map(|t| t.kind).collect()
    }

    fn tokens(input: &str) -> (Vec<Token>, Option<LexError>) {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let tokens: Vec<Token> = tokenizer.by_ref().collect();
        (tokens, tokenizer.take_error())
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![EndOfInput]);
    }

    #[test]
    fn test_end_of_input_repeats() {
        let mut tokenizer = Tokenizer::new("x".as_bytes());
        assert_eq!(tokenizer.next_token().kind, Identifier);
        assert_eq!(tokenizer.next_token().kind, EndOfInput);
        assert_eq!(tokenizer.next_token().kind, EndOfInput);
    }

    #[test]
    fn test_simple_pairs() {
        let input = "xxx: \"xxx\"\nyyy: 2\n";
        assert_eq!(
            kinds(input),
            vec![Identifier, Colon, String, Identifier, Colon, Number, EndOfInput]
        );
    }

    #[test]
    fn test_nested_then_sibling() {
        let input = "a: \n  b: \"b\"\nc: \"c\"\n";
        assert_eq!(
            kinds(input),
            vec![
                Identifier, Colon, Indent, Identifier, Colon, String, Dedent, Identifier, Colon,
                String, EndOfInput,
            ]
        );
    }

    #[test]
    fn test_indentation_sequence() {
        let input = "
foo:\"foo\"
bar: \"bar\"

baz:         \"baz\"
xxx:
  test: \"xxx\"
  v:
    x: \"xxx\"
";
        assert_eq!(
            kinds(input),
            vec![
                Identifier, Colon, String, // foo
                Identifier, Colon, String, // bar
                Identifier, Colon, String, // baz
                Identifier, Colon, // xxx
                Indent, Identifier, Colon, String, Dedent, // test
                Indent, Identifier, Colon, Dedent, // v
                Indent, Indent, Identifier, Colon, String, Dedent, Dedent, // x
                EndOfInput,
            ]
        );
    }

    #[test]
    fn test_end_of_input_unwinds_indents() {
        let mut tokenizer = Tokenizer::new("a:\n    b: 1".as_bytes());
        let kinds: Vec<TokenKind> = tokenizer.by_ref().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![Identifier, Colon, Indent, Indent, Identifier, Colon, Number, Dedent, Dedent, EndOfInput]
        );
        assert_eq!(tokenizer.indent_level(), 0);
    }

    #[test]
    fn test_trailing_spaces_are_insignificant() {
        assert_eq!(
            kinds("a: 1   \nb: 2"),
            vec![Identifier, Colon, Number, Identifier, Colon, Number, EndOfInput]
        );
    }

    #[test]
    fn test_whitespace_only_line() {
        assert_eq!(
            kinds("a:\n  b: 1\n  \n  c: 2\n"),
            vec![
                Identifier, Colon, Indent, Identifier, Colon, Number, Dedent, Indent, Dedent,
                Indent, Identifier, Colon, Number, Dedent, EndOfInput,
            ]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        assert_eq!(kinds("a: 1\r\nb: 2\r\n"), kinds("a: 1\nb: 2\n"));
    }

    #[test]
    fn test_colon_skips_whitespace() {
        let (with_spaces, _) = tokens("key:    'value'");
        let (with_one, _) = tokens("key: 'value'");
        let kinds_a: Vec<TokenKind> = with_spaces.iter().map(|t| t.kind).collect();
        let kinds_b: Vec<TokenKind> = with_one.iter().map(|t| t.kind).collect();
        assert_eq!(kinds_a, kinds_b);
        assert_eq!(with_spaces[2].text, "value");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(kinds("true false truth"), vec![True, False, Identifier, EndOfInput]);
    }

    #[test]
    fn test_identifiers_have_no_digits() {
        let (toks, error) = tokens("ab1");
        assert_eq!(toks[0].kind, Identifier);
        assert_eq!(toks[0].text, "ab");
        assert_eq!(toks[1].kind, Number);
        assert_eq!(error, None);
    }

    #[test]
    fn test_identifier_with_leading_underscore() {
        let (toks, _) = tokens("_private: 1");
        assert_eq!(toks[0].kind, Identifier);
        assert_eq!(toks[0].text, "_private");
    }

    #[test]
    fn test_string_escapes() {
        let (toks, error) = tokens(r#""a\nb\t\"c\"""#);
        assert_eq!(error, None);
        assert_eq!(toks[0].kind, String);
        assert_eq!(toks[0].text, "a\nb\t\"c\"");
    }

    #[test]
    fn test_single_quoted_string() {
        let (toks, error) = tokens(r#"'it\'s "fine"'"#);
        assert_eq!(error, None);
        assert_eq!(toks[0].text, "it's \"fine\"");
    }

    #[test]
    fn test_bad_escape() {
        let (toks, error) = tokens(r#""a\qb""#);
        assert_eq!(toks[0].kind, Illegal);
        assert_eq!(error, Some(LexError::BadEscapedChar('q', Position::new(1, 4))));
    }

    #[test]
    fn test_other_quote_escape_is_rejected() {
        let (_, error) = tokens(r#""\'""#);
        assert_eq!(error, Some(LexError::BadEscapedChar('\'', Position::new(1, 3))));
    }

    #[test]
    fn test_unterminated_string() {
        let (toks, error) = tokens("\"abc");
        assert_eq!(toks[0].kind, Illegal);
        assert_eq!(toks.last().map(|t| t.kind), Some(EndOfInput));
        assert_eq!(error, Some(LexError::UnterminatedString(Position::new(1, 1))));
    }

    #[test]
    fn test_control_character_in_string() {
        let (_, error) = tokens("k: \"ab\ncd\"");
        assert_eq!(error, Some(LexError::ControlCharInString(Position::new(1, 7))));
    }

    #[test]
    fn test_numbers() {
        for literal in ["0", "7", "1234", "3.14", "0.5", "1e10", "2E-3", "6.02e+23"] {
            let (toks, error) = tokens(literal);
            assert_eq!(error, None, "{}", literal);
            assert_eq!(toks[0].kind, Number, "{}", literal);
            assert_eq!(toks[0].text, literal);
        }
    }

    #[test]
    fn test_leading_zero() {
        let (toks, error) = tokens("0123");
        assert_eq!(toks[0].kind, Illegal);
        assert_eq!(error, Some(LexError::LeadingZero(Position::new(1, 2))));
    }

    #[test]
    fn test_missing_fraction_digits() {
        let (_, error) = tokens("n: 1.x");
        assert_eq!(error, Some(LexError::ExpectedFractionDigits(Position::new(1, 6))));
    }

    #[test]
    fn test_missing_exponent_digits() {
        let (_, error) = tokens("1e+");
        assert_eq!(error, Some(LexError::ExpectedExponentDigits(Position::new(1, 4))));
    }

    #[test]
    fn test_first_error_wins() {
        let (_, error) = tokens("a: 01\nb: \"x");
        assert_eq!(error, Some(LexError::LeadingZero(Position::new(1, 5))));
    }

    #[test]
    fn test_tab_not_allowed() {
        let (toks, error) = tokens("\ta: 1");
        assert_eq!(toks[0].kind, Illegal);
        assert_eq!(error, Some(LexError::TabNotAllowed(Position::new(1, 1))));
    }

    #[test]
    fn test_unexpected_character() {
        let (toks, error) = tokens("a: -1");
        assert_eq!(toks[2].kind, Illegal);
        assert_eq!(error, Some(LexError::UnexpectedChar('-', Position::new(1, 4))));
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(kinds("{,}"), vec![LeftBrace, Comma, RightBrace, EndOfInput]);
    }

    #[test]
    fn test_positions_are_byte_columns() {
        let (toks, _) = tokens("s: \"héllo\" \nk: 1");
        assert_eq!(toks[0].position, Position::new(1, 1));
        assert_eq!(toks[1].position, Position::new(1, 2));
        assert_eq!(toks[2].position, Position::new(1, 4));
        assert_eq!(toks[2].text, "héllo");
        assert_eq!(toks[3].position, Position::new(2, 1));
        let (toks, _) = tokens("\"é\" 1");
        assert_eq!(toks[1].position, Position::new(1, 6));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut tokenizer = Tokenizer::new(&b"a: \"\xff\""[..]);
        let _: Vec<Token> = tokenizer.by_ref().collect();
        assert_eq!(
            tokenizer.error(),
            Some(&LexError::InvalidUtf8(Position::new(1, 5)))
        );
    }

    /// Hands out its data in one read, then fails.
    struct FailingReader {
        data: &'static [u8],
        done: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.done {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
            }
            self.done = true;
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            Ok(n)
        }
    }

    #[test]
    fn test_read_failure_ends_input() {
        let mut tokenizer = Tokenizer::new(FailingReader {
            data: b"a: 1",
            done: false,
        });
        let kinds: Vec<TokenKind> = tokenizer.by_ref().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![Identifier, Colon, Number, EndOfInput]);
        assert_eq!(
            tokenizer.error(),
            Some(&LexError::Read("disk gone".to_string(), Position::new(1, 5)))
        );
        assert_eq!(tokenizer.next_token().kind, EndOfInput);
    }

    #[test]
    fn test_spaces_inside_a_line_are_not_indentation() {
        assert_eq!(kinds("a  : 1"), vec![Identifier, Colon, Number, EndOfInput]);
        assert_eq!(
            kinds("a:\n  b  :  1"),
            vec![Identifier, Colon, Indent, Identifier, Colon, Number, Dedent, EndOfInput]
        );
    }

    #[test]
    fn test_indent_tokens_balance() {
        let input = "a:\n  b:\n    c:\n      d: 1\n  e: 2\nf:\n  g: 3";
        let kinds = kinds(input);
        let indents = kinds.iter().filter(|k| **k == Indent).count();
        let dedents = kinds.iter().filter(|k| **k == Dedent).count();
        assert_eq!(indents, dedents);
    }
}
