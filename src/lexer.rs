//! The lexer converts a buffer of `char`s into an ordered sequence of [PackedToken]s.
//!
//! Lexing is a single forward pass. Failures don't stop the lexer: a malformed literal, string or
//! number produces a [Token::Invalid] carrying the reason, scanning resumes after it, and it's up
//! to the parser to surface the failure when (and if) it reaches that token. The sequence is always
//! terminated by exactly one [Token::EndOfInput].
use std::fmt::{Display, Formatter};
use std::io::{BufRead, BufReader};

use crate::coords::{Coords, Span};
use crate::encoding::{decode_chars, Encoding};
use crate::errors::Details;

/// Default string buffer capacity
const DEFAULT_BUFFER_CAPACITY: usize = 1024;

/// Enumeration of valid JSON tokens, plus an invalid marker
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Colon,
    Comma,
    Str(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    EndOfInput,
    Invalid(Details),
}

impl Token {
    /// The [TokenKind] for this token
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::StartObject => TokenKind::StartObject,
            Token::EndObject => TokenKind::EndObject,
            Token::StartArray => TokenKind::StartArray,
            Token::EndArray => TokenKind::EndArray,
            Token::Colon => TokenKind::Colon,
            Token::Comma => TokenKind::Comma,
            Token::Str(_) => TokenKind::Str,
            Token::Integer(_) => TokenKind::Integer,
            Token::Float(_) => TokenKind::Float,
            Token::Boolean(_) => TokenKind::Boolean,
            Token::Null => TokenKind::Null,
            Token::EndOfInput => TokenKind::EndOfInput,
            Token::Invalid(_) => TokenKind::Invalid,
        }
    }
}

/// Payload-free token classification, used in diagnostics
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Colon,
    Comma,
    Str,
    Integer,
    Float,
    Boolean,
    Null,
    EndOfInput,
    Invalid,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::StartObject => write!(f, "'{{'"),
            TokenKind::EndObject => write!(f, "'}}'"),
            TokenKind::StartArray => write!(f, "'['"),
            TokenKind::EndArray => write!(f, "']'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Str => write!(f, "string"),
            TokenKind::Integer => write!(f, "integer"),
            TokenKind::Float => write!(f, "float"),
            TokenKind::Boolean => write!(f, "boolean"),
            TokenKind::Null => write!(f, "null"),
            TokenKind::EndOfInput => write!(f, "end of input"),
            TokenKind::Invalid => write!(f, "invalid token"),
        }
    }
}

/// A packed token consists of a [Token] and the [Span] associated with it
pub type PackedToken = (Token, Span);

/// Convenience macro for packing tokens along with their positional information
macro_rules! packed_token {
    ($t:expr, $s:expr, $e:expr) => {
        ($t, Span { start: $s, end: $e })
    };
    ($t:expr, $s:expr) => {
        ($t, Span { start: $s, end: $s })
    };
}

/// Whitespace that may appear between tokens
#[inline]
fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Characters that may be part of a numeric literal. The run is collected greedily and
/// validated afterwards, so that something like `1.2.3` is reported as one bad number.
#[inline]
fn is_numeric_char(c: char) -> bool {
    matches!(c, '0'..='9' | '-' | '+' | '.' | 'e' | 'E')
}

/// The shape of a validated numeric literal
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum NumberShape {
    Integer,
    Float,
}

/// Check a numeric literal against the JSON number grammar:
/// `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`
fn number_shape(literal: &str) -> Option<NumberShape> {
    let bytes = literal.as_bytes();
    let mut index = 0;
    let mut shape = NumberShape::Integer;

    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    if bytes.first() == Some(&b'-') {
        index += 1;
    }
    match bytes.get(index) {
        Some(b'0') => index += 1,
        Some(b'1'..=b'9') => index += digits(index),
        _ => return None,
    }
    if bytes.get(index) == Some(&b'.') {
        shape = NumberShape::Float;
        index += 1;
        let count = digits(index);
        if count == 0 {
            return None;
        }
        index += count;
    }
    if matches!(bytes.get(index), Some(b'e') | Some(b'E')) {
        shape = NumberShape::Float;
        index += 1;
        if matches!(bytes.get(index), Some(b'+') | Some(b'-')) {
            index += 1;
        }
        let count = digits(index);
        if count == 0 {
            return None;
        }
        index += count;
    }
    (index == bytes.len()).then_some(shape)
}

/// A single-pass lexer over an in-memory buffer of `char`s
#[derive(Debug)]
pub struct Lexer {
    /// The input characters
    input: Vec<char>,
    /// Index of the next unconsumed character
    position: usize,
    /// Coordinates of the last consumed character
    coords: Coords,
    /// Produced tokens, populated by [Lexer::process]
    tokens: Vec<PackedToken>,
    /// Scratch buffer used for strings, numbers and bare words
    buffer: String,
    /// Whether [Lexer::process] has already run
    processed: bool,
    /// Why the byte source stopped short of its end, if it did. Reported where the input ends
    input_failure: Option<Details>,
}

impl Lexer {
    /// Create a new lexer over a string slice
    pub fn new(input: &str) -> Self {
        Self::from_chars(input.chars())
    }

    /// Create a new lexer over an arbitrary `char` iterator
    pub fn from_chars(chars: impl Iterator<Item = char>) -> Self {
        Lexer {
            input: chars.collect(),
            position: 0,
            coords: Coords::default(),
            tokens: vec![],
            buffer: String::with_capacity(DEFAULT_BUFFER_CAPACITY),
            processed: false,
            input_failure: None,
        }
    }

    /// Create a new lexer over a byte source, decoded with a specific [Encoding]. A byte
    /// sequence that isn't valid for the encoding ends the input and is reported as an invalid
    /// token at that position
    pub fn from_reader<B: BufRead>(mut reader: B, encoding: Encoding) -> Self {
        let decoded = decode_chars(&mut reader, encoding);
        let mut lexer = Self::from_chars(decoded.chars.into_iter());
        lexer.input_failure = decoded.failure;
        lexer
    }

    /// Create a new lexer over a UTF-8 encoded byte slice
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_reader(BufReader::new(bytes), Encoding::Utf8)
    }

    /// Lex the whole input, populating the internal token sequence. Calling this more than once
    /// is harmless, subsequent calls just return the sequence produced by the first.
    pub fn process(&mut self) -> &[PackedToken] {
        if !self.processed {
            self.processed = true;
            loop {
                let packed = self.consume();
                let done = packed.0 == Token::EndOfInput;
                self.tokens.push(packed);
                if done {
                    break;
                }
            }
        }
        &self.tokens
    }

    /// The tokens produced so far. Empty until [Lexer::process] has been called
    pub fn tokens(&self) -> &[PackedToken] {
        &self.tokens
    }

    /// Whether [Lexer::process] has already run
    pub fn is_processed(&self) -> bool {
        self.processed
    }

    /// Whether any [Token::Invalid] was produced
    pub fn has_invalid_tokens(&self) -> bool {
        self.tokens
            .iter()
            .any(|(token, _)| matches!(token, Token::Invalid(_)))
    }

    /// Consume the lexer, handing over the token sequence
    pub fn into_tokens(mut self) -> Vec<PackedToken> {
        self.process();
        self.tokens
    }

    /// Look at the next unconsumed character
    #[inline]
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Consume the next character, returning it along with its [Coords]
    #[inline]
    fn advance(&mut self) -> Option<(char, Coords)> {
        let c = self.peek()?;
        self.position += 1;
        self.coords = self.coords.advance(c);
        Some((c, self.coords))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, is_whitespace) {
            self.advance();
        }
    }

    /// Consume the next token from the input. One character of lookahead selects the rule; the
    /// rule then consumes as much input as it needs.
    fn consume(&mut self) -> PackedToken {
        self.skip_whitespace();
        match self.peek() {
            None => match self.input_failure.take() {
                Some(details) => packed_token!(Token::Invalid(details), self.coords.advance(' ')),
                None => packed_token!(Token::EndOfInput, self.coords),
            },
            Some('{') => self.match_single(Token::StartObject),
            Some('}') => self.match_single(Token::EndObject),
            Some('[') => self.match_single(Token::StartArray),
            Some(']') => self.match_single(Token::EndArray),
            Some(':') => self.match_single(Token::Colon),
            Some(',') => self.match_single(Token::Comma),
            Some('"') => self.match_string(),
            Some('-') | Some('0'..='9') => self.match_number(),
            Some(c) if c.is_ascii_alphabetic() => self.match_literal(),
            Some(c) => {
                let at = self.advance().map_or(self.coords, |(_, coords)| coords);
                packed_token!(Token::Invalid(Details::InvalidCharacter(c)), at)
            }
        }
    }

    /// Why the input ran out part way through a token. A bad byte sequence in the source takes
    /// precedence over a plain unterminated string
    fn truncation(&mut self) -> Details {
        self.input_failure
            .take()
            .unwrap_or(Details::UnterminatedString)
    }

    /// Consume a single structural character
    fn match_single(&mut self, token: Token) -> PackedToken {
        let at = self.advance().map_or(self.coords, |(_, coords)| coords);
        packed_token!(token, at)
    }

    /// Consume a bare word and match it against `true`, `false` and `null`
    fn match_literal(&mut self) -> PackedToken {
        self.buffer.clear();
        let start = self.coords.advance(' ');
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphanumeric()) {
            self.buffer.push(c);
            self.advance();
        }
        let token = match self.buffer.as_str() {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            word => Token::Invalid(Details::InvalidLiteral(word.to_string())),
        };
        packed_token!(token, start, self.coords)
    }

    /// Consume a numeric literal. Whether the token is an integer or a float is decided here,
    /// purely by the shape of the literal: no fraction and no exponent means integer.
    fn match_number(&mut self) -> PackedToken {
        self.buffer.clear();
        let start = self.coords.advance(' ');
        while let Some(c) = self.peek().filter(|c| is_numeric_char(*c)) {
            self.buffer.push(c);
            self.advance();
        }
        let invalid = || Token::Invalid(Details::InvalidNumericRepresentation(self.buffer.clone()));
        let token = match number_shape(&self.buffer) {
            Some(NumberShape::Integer) => match lexical::parse::<i64, _>(self.buffer.as_bytes()) {
                Ok(value) => Token::Integer(value),
                Err(_) => invalid(),
            },
            Some(NumberShape::Float) => match fast_float::parse::<f64, _>(self.buffer.as_bytes()) {
                Ok(value) if value.is_finite() => Token::Float(value),
                _ => invalid(),
            },
            None => invalid(),
        };
        packed_token!(token, start, self.coords)
    }

    /// Consume a string literal, translating escape sequences as we go. Problems inside the
    /// string are remembered and reported once the closing quote is found, so that lexing can
    /// carry on from a sensible position.
    fn match_string(&mut self) -> PackedToken {
        let mut value = String::new();
        let mut failure: Option<Details> = None;
        let start = match self.advance() {
            Some((_, coords)) => coords,
            None => self.coords,
        };

        loop {
            let Some((c, _)) = self.advance() else {
                return packed_token!(
                    Token::Invalid(self.truncation()),
                    start,
                    self.coords
                );
            };
            match c {
                '"' => break,
                '\\' => match self.match_escape_sequence() {
                    Ok(Some(unescaped)) => value.push(unescaped),
                    Ok(None) => {
                        return packed_token!(
                            Token::Invalid(self.truncation()),
                            start,
                            self.coords
                        )
                    }
                    Err(details) => {
                        failure.get_or_insert(details);
                    }
                },
                c if (c as u32) < 0x20 => {
                    failure.get_or_insert(Details::ControlCharacterInString(c));
                }
                c => value.push(c),
            }
        }

        let token = match failure {
            Some(details) => Token::Invalid(details),
            None => Token::Str(value),
        };
        packed_token!(token, start, self.coords)
    }

    /// Translate the escape sequence following a backslash. Returns `Ok(None)` if the input ends
    /// part way through the sequence.
    fn match_escape_sequence(&mut self) -> Result<Option<char>, Details> {
        let Some((c, _)) = self.advance() else {
            return Ok(None);
        };
        let unescaped = match c {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => return self.match_unicode_escape_sequence(),
            other => return Err(Details::InvalidEscapeSequence(format!("\\{}", other))),
        };
        Ok(Some(unescaped))
    }

    /// Match a unicode escape of the form `uXXXX`, combining a UTF-16 surrogate pair written as
    /// two consecutive escapes
    fn match_unicode_escape_sequence(&mut self) -> Result<Option<char>, Details> {
        let Some(high) = self.match_hex_quad()? else {
            return Ok(None);
        };
        match high {
            0xD800..=0xDBFF => {
                if self.peek() != Some('\\') || self.input.get(self.position + 1) != Some(&'u') {
                    return Err(Details::InvalidUnicodeEscapeSequence(format!(
                        "\\u{:04x}",
                        high
                    )));
                }
                self.advance();
                self.advance();
                let Some(low) = self.match_hex_quad()? else {
                    return Ok(None);
                };
                if !(0xDC00..=0xDFFF).contains(&low) {
                    return Err(Details::InvalidUnicodeEscapeSequence(format!(
                        "\\u{:04x}\\u{:04x}",
                        high, low
                    )));
                }
                let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                char::from_u32(combined).map(Some).ok_or_else(|| {
                    Details::InvalidUnicodeEscapeSequence(format!("\\u{:04x}\\u{:04x}", high, low))
                })
            }
            0xDC00..=0xDFFF => Err(Details::InvalidUnicodeEscapeSequence(format!(
                "\\u{:04x}",
                high
            ))),
            code => char::from_u32(code)
                .map(Some)
                .ok_or_else(|| Details::InvalidUnicodeEscapeSequence(format!("\\u{:04x}", code))),
        }
    }

    /// Read exactly four hex digits
    fn match_hex_quad(&mut self) -> Result<Option<u32>, Details> {
        let mut digits = String::with_capacity(4);
        for _ in 0..4 {
            let Some((c, _)) = self.advance() else {
                return Ok(None);
            };
            digits.push(c);
            if !c.is_ascii_hexdigit() {
                return Err(Details::InvalidUnicodeEscapeSequence(format!("\\u{}", digits)));
            }
        }
        u32::from_str_radix(&digits, 16)
            .map(Some)
            .map_err(|_| Details::InvalidUnicodeEscapeSequence(format!("\\u{}", digits)))
    }
}
