use std::fs;
use std::io::BufReader;
use std::path::PathBuf;

use json_shape::encoding::Encoding;
use json_shape::errors::Details;
use json_shape::lexer::{Lexer, Token, TokenKind};

macro_rules! relative_file {
    ($f : expr) => {{
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join($f)
    }};
}

fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input)
        .into_tokens()
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}

#[test]
fn should_parse_basic_tokens() {
    assert_eq!(
        lex("{}[],:"),
        [
            Token::StartObject,
            Token::EndObject,
            Token::StartArray,
            Token::EndArray,
            Token::Comma,
            Token::Colon,
            Token::EndOfInput
        ]
    );
}

#[test]
fn should_parse_null_and_booleans() {
    assert_eq!(
        lex("null true    false"),
        [
            Token::Null,
            Token::Boolean(true),
            Token::Boolean(false),
            Token::EndOfInput
        ]
    );
}

#[test]
fn should_reject_run_together_literals() {
    let tokens = lex("falsetrue");
    assert_eq!(
        tokens[0],
        Token::Invalid(Details::InvalidLiteral("falsetrue".to_string()))
    );
    assert_eq!(tokens.last(), Some(&Token::EndOfInput));
}

#[test]
fn should_tag_numbers_by_shape() {
    assert_eq!(
        lex("[1, 1.0, -0, 2e3, 3E-2]"),
        [
            Token::StartArray,
            Token::Integer(1),
            Token::Comma,
            Token::Float(1.0),
            Token::Comma,
            Token::Integer(0),
            Token::Comma,
            Token::Float(2000.0),
            Token::Comma,
            Token::Float(0.03),
            Token::EndArray,
            Token::EndOfInput
        ]
    );
}

#[test]
fn should_keep_going_after_an_invalid_token() {
    let mut lexer = Lexer::new("[01, \"ok\"]");
    let kinds: Vec<TokenKind> = lexer.process().iter().map(|(t, _)| t.kind()).collect();
    assert!(lexer.has_invalid_tokens());
    assert_eq!(
        kinds,
        [
            TokenKind::StartArray,
            TokenKind::Invalid,
            TokenKind::Comma,
            TokenKind::Str,
            TokenKind::EndArray,
            TokenKind::EndOfInput
        ]
    );
}

#[test]
fn should_track_line_and_column() {
    let tokens = Lexer::new("{\n  \"a\": 1\n}").into_tokens();
    let (token, span) = &tokens[1];
    assert_eq!(token, &Token::Str("a".to_string()));
    assert_eq!((span.start.line, span.start.column), (2, 3));
    let (token, span) = &tokens[4];
    assert_eq!(token, &Token::EndObject);
    assert_eq!((span.start.line, span.start.column), (3, 1));
}

#[test]
fn should_lex_byte_sources() {
    let reader = BufReader::new("[\"€\"]".as_bytes());
    let tokens: Vec<Token> = Lexer::from_reader(reader, Encoding::Utf8)
        .into_tokens()
        .into_iter()
        .map(|(t, _)| t)
        .collect();
    assert_eq!(tokens[1], Token::Str("€".to_string()));
}

#[test]
fn should_lex_every_valid_fixture_cleanly() {
    for f in fs::read_dir(relative_file!("fixtures/json/valid")).unwrap() {
        let path = f.unwrap().path();
        let bytes = fs::read(&path).unwrap();
        let mut lexer = Lexer::from_bytes(&bytes);
        let tokens = lexer.process();
        assert_eq!(tokens.last().map(|(t, _)| t.kind()), Some(TokenKind::EndOfInput));
        assert!(!lexer.has_invalid_tokens(), "{:?}", path);
    }
}

#[test]
fn should_lex_the_bench_corpus() {
    let bytes = fs::read(relative_file!("fixtures/json/bench/people.json")).unwrap();
    let mut lexer = Lexer::from_bytes(&bytes);
    assert!(lexer.process().len() > 2000);
    assert!(!lexer.has_invalid_tokens());
}
