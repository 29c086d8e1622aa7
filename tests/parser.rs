use std::fs;
use std::path::PathBuf;

use json_shape::ast::{Node, NodeKind};
use json_shape::errors::{Details, Stage};
use json_shape::lexer::{Lexer, TokenKind};
use json_shape::parser::Parser;
use json_shape::{parse_str, ErrorKind};

macro_rules! relative_file {
    ($f : expr) => {{
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join($f)
    }};
}

#[test]
fn should_parse_the_person_fixture() {
    let bytes = fs::read(relative_file!("fixtures/json/valid/person.json")).unwrap();
    let mut parser = Parser::new(Lexer::from_bytes(&bytes));
    let root = parser.process().unwrap();
    assert_eq!(root.kind(), NodeKind::Object);
    assert!(matches!(root.get("balance"), Some(Node::Integer(200, _))));
    let education = root.get("current_education").unwrap();
    assert!(matches!(education.get("degree"), Some(Node::String(d, _)) if d == "Y"));
    let scores = root.get("scores").unwrap();
    assert_eq!(scores.index(2).map(Node::kind), Some(NodeKind::Integer));
    assert_eq!(root.depth(), 3);
}

#[test]
fn should_keep_float_tags_on_integral_values() {
    let root = parse_str(r#"{"x1": 1.00, "x2": 66}"#).unwrap();
    assert_eq!(root.get("x1").map(Node::kind), Some(NodeKind::Float));
    assert_eq!(root.get("x2").map(Node::kind), Some(NodeKind::Integer));
}

#[test]
fn missing_value_should_be_a_syntax_error() {
    let err = parse_str(r#"{"a": }"#).unwrap_err();
    assert_eq!(err.stage, Stage::Parser);
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(
        err.details,
        Details::UnexpectedToken {
            expected: "value",
            found: TokenKind::EndObject
        }
    );
}

#[test]
fn bad_numbers_should_be_lexical_errors() {
    let err = parse_str(r#"{"a": 1.2.3}"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lexical);
    assert_eq!(
        err.details,
        Details::InvalidNumericRepresentation("1.2.3".to_string())
    );
    assert_eq!(err.coords.map(|c| c.column), Some(7));
}

#[test]
fn should_reject_every_invalid_fixture() {
    for f in fs::read_dir(relative_file!("fixtures/json/invalid")).unwrap() {
        let path = f.unwrap().path();
        let bytes = fs::read(&path).unwrap();
        let mut parser = Parser::new(Lexer::from_bytes(&bytes));
        let err = parser.process().unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::Lexical | ErrorKind::Syntax),
            "{:?} failed with {}",
            path,
            err
        );
        assert!(err.coords.is_some(), "{:?} has no position", path);
        assert!(parser.root().is_none());
    }
}

#[test]
fn errors_should_render_their_position() {
    let err = parse_str("[1,\n  ]").unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("line: 2, column: 3"), "{}", rendered);
    assert!(rendered.contains("']'"), "{}", rendered);
}

#[test]
fn should_parse_the_bench_corpus() {
    let bytes = fs::read(relative_file!("fixtures/json/bench/people.json")).unwrap();
    let mut parser = Parser::new(Lexer::from_bytes(&bytes));
    let root = parser.process().unwrap();
    match root {
        Node::Array(people, _) => {
            assert!(!people.is_empty());
            assert!(people.iter().all(|p| p.kind() == NodeKind::Object));
        }
        other => panic!("unexpected root {:?}", other.kind()),
    }
}
