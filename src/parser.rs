//! Recursive-descent parser, building a single [Node] tree from a token sequence.
//!
//! ```text
//! value      := object | array | string | number | boolean | null
//! object     := '{' (pair (',' pair)*)? '}'
//! pair       := string ':' value
//! array      := '[' (value (',' value)*)? ']'
//! ```
//!
//! One token of lookahead, no backtracking. Nesting depth is bounded only by the call stack.
use std::iter::Peekable;
use std::vec::IntoIter;

use crate::ast::{KeyValuePair, Node};
use crate::coords::Span;
use crate::decoder::{Decode, Decoder, DecoderOptions};
use crate::errors::{Details, ParserResult};
use crate::lexer::{Lexer, PackedToken, Token, TokenKind};
use crate::{decoder_error, lexer_error, parser_error};

/// Main JSON parser struct
#[derive(Debug)]
pub struct Parser {
    /// Tokens not yet consumed. Each one is moved out exactly once
    tokens: Peekable<IntoIter<PackedToken>>,
    /// Span of the end-of-input marker, handed out again once the tokens run out
    end: Span,
    /// The AST, once successfully built
    root: Option<Node>,
    /// Whether [Parser::process] has been called
    processed: bool,
    /// Options handed to the [Decoder] by [Parser::decode]
    options: DecoderOptions,
}

impl Parser {
    /// Create a parser over the tokens of a lexer, lexing the input first if that hasn't
    /// happened yet
    pub fn new(lexer: Lexer) -> Self {
        Self::from_tokens(lexer.into_tokens())
    }

    /// Create a parser over an existing token sequence. A missing end-of-input marker is added
    pub fn from_tokens(mut tokens: Vec<PackedToken>) -> Self {
        if tokens.last().map(|(t, _)| t.kind()) != Some(TokenKind::EndOfInput) {
            let end = tokens.last().map(|(_, span)| span.end).unwrap_or_default();
            tokens.push((Token::EndOfInput, Span { start: end, end }));
        }
        let end = tokens.last().map(|(_, span)| *span).unwrap_or_default();
        Parser {
            tokens: tokens.into_iter().peekable(),
            end,
            root: None,
            processed: false,
            options: DecoderOptions::default(),
        }
    }

    /// Use a specific set of [DecoderOptions] for subsequent calls to [Parser::decode]
    pub fn with_options(mut self, options: DecoderOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the AST. May only be called once per parser
    pub fn process(&mut self) -> ParserResult<&Node> {
        if self.processed {
            return parser_error!(Details::AlreadyProcessed);
        }
        self.processed = true;
        let root = self.parse_value()?;
        match self.next()? {
            (Token::EndOfInput, _) => (),
            (token, span) => {
                return parser_error!(Details::TrailingContent(token.kind()), span.start);
            }
        }
        Ok(&*self.root.insert(root))
    }

    /// The AST, if [Parser::process] has succeeded
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Take ownership of the AST
    pub fn into_root(self) -> Option<Node> {
        self.root
    }

    /// The number of tokens not yet consumed, end-of-input marker included
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }

    /// Decode the AST into `destination`, which is left untouched on failure. Fails with a
    /// precondition error unless [Parser::process] has succeeded
    pub fn decode<T: Decode>(&self, destination: &mut T) -> ParserResult<()> {
        match &self.root {
            Some(root) => Decoder::new(self.options).decode_into(root, destination),
            None => decoder_error!(Details::NotProcessed),
        }
    }

    /// Look at the kind of the next token without consuming it
    fn peek_kind(&mut self) -> TokenKind {
        self.tokens
            .peek()
            .map_or(TokenKind::EndOfInput, |(t, _)| t.kind())
    }

    /// Consume the next token. Invalid tokens are turned into lexical errors here, so none of
    /// the grammar rules need to care about them
    fn next(&mut self) -> ParserResult<PackedToken> {
        match self.tokens.next() {
            Some((Token::Invalid(details), span)) => lexer_error!(details, span.start),
            Some(packed) => Ok(packed),
            None => Ok((Token::EndOfInput, self.end)),
        }
    }

    fn parse_value(&mut self) -> ParserResult<Node> {
        match self.next()? {
            (Token::StartObject, span) => self.parse_object(span),
            (Token::StartArray, span) => self.parse_array(span),
            (Token::Str(value), span) => Ok(Node::String(value, span)),
            (Token::Integer(value), span) => Ok(Node::Integer(value, span)),
            (Token::Float(value), span) => Ok(Node::Float(value, span)),
            (Token::Boolean(value), span) => Ok(Node::Boolean(value, span)),
            (Token::Null, span) => Ok(Node::Null(span)),
            (token, span) => parser_error!(
                Details::UnexpectedToken {
                    expected: "value",
                    found: token.kind()
                },
                span.start
            ),
        }
    }

    /// An object is just a list of comma separated KV pairs
    fn parse_object(&mut self, start: Span) -> ParserResult<Node> {
        let mut pairs = vec![];
        if self.peek_kind() == TokenKind::EndObject {
            let (_, end) = self.next()?;
            return Ok(Node::Object(pairs, start.merge(&end)));
        }
        loop {
            pairs.push(self.parse_pair()?);
            match self.next()? {
                (Token::Comma, _) => (),
                (Token::EndObject, end) => return Ok(Node::Object(pairs, start.merge(&end))),
                (token, span) => {
                    return parser_error!(
                        Details::UnexpectedToken {
                            expected: "',' or '}'",
                            found: token.kind()
                        },
                        span.start
                    );
                }
            }
        }
    }

    fn parse_pair(&mut self) -> ParserResult<KeyValuePair> {
        let (key, key_span) = match self.next()? {
            (Token::Str(key), span) => (key, span),
            (token, span) => {
                return parser_error!(
                    Details::UnexpectedToken {
                        expected: "string key",
                        found: token.kind()
                    },
                    span.start
                );
            }
        };
        match self.next()? {
            (Token::Colon, _) => (),
            (token, span) => {
                return parser_error!(
                    Details::UnexpectedToken {
                        expected: "':'",
                        found: token.kind()
                    },
                    span.start
                );
            }
        }
        Ok(KeyValuePair {
            key,
            key_span,
            value: self.parse_value()?,
        })
    }

    /// An array is just a list of comma separated values
    fn parse_array(&mut self, start: Span) -> ParserResult<Node> {
        let mut values = vec![];
        if self.peek_kind() == TokenKind::EndArray {
            let (_, end) = self.next()?;
            return Ok(Node::Array(values, start.merge(&end)));
        }
        loop {
            values.push(self.parse_value()?);
            match self.next()? {
                (Token::Comma, _) => (),
                (Token::EndArray, end) => return Ok(Node::Array(values, start.merge(&end))),
                (token, span) => {
                    return parser_error!(
                        Details::UnexpectedToken {
                            expected: "',' or ']'",
                            found: token.kind()
                        },
                        span.start
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Node, NodeKind};
    use crate::errors::{Details, ErrorKind, Stage};
    use crate::lexer::{Lexer, TokenKind};
    use crate::parser::Parser;

    fn parse(input: &str) -> crate::errors::ParserResult<Node> {
        let mut parser = Parser::new(Lexer::new(input));
        parser.process().cloned()
    }

    #[test]
    fn should_parse_char_iterators_directly() {
        let source = r#"{
            "test" : 1232.0,
            "some other" : "thasdasd",
            "a bool" : true,
            "an array" : [1,2,3,4,5.8,6,7.2,7,8,10]
        }"#;
        let root = parse(source).unwrap();
        assert!(matches!(root.get("test"), Some(Node::Float(v, _)) if *v == 1232.0));
        assert!(matches!(root.get("a bool"), Some(Node::Boolean(true, _))));
        let array = root.get("an array").unwrap();
        assert_eq!(array.index(4).map(Node::kind), Some(NodeKind::Float));
        assert_eq!(array.index(5).map(Node::kind), Some(NodeKind::Integer));
    }

    #[test]
    fn should_accept_scalars_at_the_root() {
        assert!(matches!(parse("  42 "), Ok(Node::Integer(42, _))));
        assert!(matches!(parse("null"), Ok(Node::Null(_))));
        assert!(matches!(parse("\"s\""), Ok(Node::String(..))));
    }

    #[test]
    fn should_keep_duplicate_keys_in_order() {
        let root = parse(r#"{"a": 1, "a": 2}"#).unwrap();
        match root {
            Node::Object(pairs, _) => {
                assert_eq!(pairs.len(), 2);
                assert_eq!(pairs[1].value, Node::Integer(2, pairs[1].value.span()));
            }
            _ => panic!(),
        }
    }

    #[test]
    fn should_report_missing_values() {
        let err = parse(r#"{"a": }"#).unwrap_err();
        assert_eq!(err.stage, Stage::Parser);
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(
            err.details,
            Details::UnexpectedToken {
                expected: "value",
                found: TokenKind::EndObject
            }
        );
        assert_eq!(err.coords.map(|c| c.column), Some(7));
    }

    #[test]
    fn should_surface_lexical_errors() {
        let err = parse(r#"{"a": 1.2.3}"#).unwrap_err();
        assert_eq!(err.stage, Stage::Lexer);
        assert_eq!(
            err.details,
            Details::InvalidNumericRepresentation("1.2.3".to_string())
        );
    }

    #[test]
    fn should_reject_structural_mistakes() {
        let cases = [
            (r#"{"a" 1}"#, TokenKind::Integer),
            (r#"{"a": 1 "b": 2}"#, TokenKind::Str),
            (r#"{1: 2}"#, TokenKind::Integer),
            (r#"[1, 2}"#, TokenKind::EndObject),
            (r#"[1, ]"#, TokenKind::EndArray),
            (r#"{"a": 1,}"#, TokenKind::EndObject),
            (r#"[1"#, TokenKind::EndOfInput),
            (r#"]"#, TokenKind::EndArray),
            (r#""#, TokenKind::EndOfInput),
        ];
        for (input, found) in cases {
            let err = parse(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax, "{input}");
            match err.details {
                Details::UnexpectedToken { found: actual, .. } => assert_eq!(actual, found, "{input}"),
                other => panic!("unexpected details for {input}: {other:?}"),
            }
        }
    }

    #[test]
    fn should_reject_trailing_content() {
        let err = parse("[1] [2]").unwrap_err();
        assert_eq!(err.details, Details::TrailingContent(TokenKind::StartArray));
    }

    #[test]
    fn decode_before_process_should_fail() {
        let parser = Parser::new(Lexer::new("[1]"));
        let mut values: Vec<i64> = vec![];
        let err = parser.decode(&mut values).unwrap_err();
        assert_eq!(err.details, Details::NotProcessed);
        assert_eq!(err.kind(), ErrorKind::Precondition);
    }

    #[test]
    fn process_should_be_one_shot() {
        let mut parser = Parser::new(Lexer::new("[1]"));
        assert!(parser.process().is_ok());
        let err = parser.process().unwrap_err();
        assert_eq!(err.details, Details::AlreadyProcessed);
        assert!(parser.root().is_some());
    }

    #[test]
    fn should_handle_deep_nesting() {
        let depth = 256;
        let input = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let root = parse(&input).unwrap();
        assert_eq!(root.depth(), depth);
    }

    #[test]
    fn empty_token_sequences_should_still_terminate() {
        let mut parser = Parser::from_tokens(vec![]);
        assert_eq!(parser.remaining(), 1);
        let err = parser.process().unwrap_err();
        assert_eq!(
            err.details,
            Details::UnexpectedToken {
                expected: "value",
                found: TokenKind::EndOfInput
            }
        );
        assert_eq!(parser.remaining(), 0);
    }
}
