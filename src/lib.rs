//! A JSON lexer, parser and type-directed decoder.
//!
//! Input flows through three stages:
//!
//! - [lexer::Lexer] turns text into a sequence of tokens, tagging every number as an integer or a
//!   float by its shape alone.
//! - [parser::Parser] builds an [ast::Node] tree from those tokens.
//! - The parser's `decode` walks the tree against the [descriptor::Descriptor] of a destination
//!   type (anything implementing [decoder::Decode]) and populates it.
//!
//! ```
//! use std::collections::HashMap;
//!
//! let scores: HashMap<String, f64> = json_shape::from_str(r#"{"x1": 1.00, "x2": 66}"#).unwrap();
//! assert_eq!(scores["x2"], 66.0);
//! ```
use std::collections::HashMap;

use crate::ast::Node;
use crate::errors::ParserResult;
use crate::lexer::Lexer;
use crate::parser::Parser;

pub mod ast;
pub mod coords;
pub mod decoder;
pub mod descriptor;
pub mod encoding;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod pointer;
#[cfg(test)]
mod test_macros;

pub use crate::decoder::{Decode, DecoderOptions};
pub use crate::errors::{Error, ErrorKind};

/// Basic enumeration of different Json values, used as the destination for documents of unknown
/// shape
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsonValue {
    /// Map of values. Duplicate keys resolve to the last value
    Object(HashMap<String, JsonValue>),
    /// Array of values
    Array(Vec<JsonValue>),
    /// Canonical string value
    String(String),
    /// Floating point numeric value
    Float(f64),
    /// Integer numeric value
    Integer(i64),
    /// Canonical boolean value
    Boolean(bool),
    /// Canonical null value
    #[default]
    Null,
}

impl JsonValue {
    /// Look up a key within an object
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            JsonValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats as they are, integers widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Float(f) => Some(*f),
            JsonValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }
}

impl From<&Node> for JsonValue {
    fn from(node: &Node) -> Self {
        match node {
            Node::String(value, _) => JsonValue::String(value.clone()),
            Node::Integer(value, _) => JsonValue::Integer(*value),
            Node::Float(value, _) => JsonValue::Float(*value),
            Node::Boolean(value, _) => JsonValue::Boolean(*value),
            Node::Null(_) => JsonValue::Null,
            Node::Array(elements, _) => JsonValue::Array(elements.iter().map(Self::from).collect()),
            Node::Object(pairs, _) => {
                let mut map = HashMap::with_capacity(pairs.len());
                for pair in pairs {
                    map.insert(pair.key.clone(), Self::from(&pair.value));
                }
                JsonValue::Object(map)
            }
        }
    }
}

/// Lex and parse a string into an AST
pub fn parse_str(input: &str) -> ParserResult<Node> {
    let mut parser = Parser::new(Lexer::new(input));
    Ok(parser.process()?.clone())
}

/// Lex, parse and decode a string into a fresh `T`
pub fn from_str<T: Decode + Default>(input: &str) -> ParserResult<T> {
    from_str_with_options(input, DecoderOptions::default())
}

/// Lex, parse and decode a string into a fresh `T`, using a specific set of [DecoderOptions]
pub fn from_str_with_options<T: Decode + Default>(
    input: &str,
    options: DecoderOptions,
) -> ParserResult<T> {
    decode_with(Lexer::new(input), options)
}

/// Lex, parse and decode UTF-8 bytes into a fresh `T`
pub fn from_bytes<T: Decode + Default>(bytes: &[u8]) -> ParserResult<T> {
    decode_with(Lexer::from_bytes(bytes), DecoderOptions::default())
}

fn decode_with<T: Decode + Default>(lexer: Lexer, options: DecoderOptions) -> ParserResult<T> {
    let mut parser = Parser::new(lexer).with_options(options);
    parser.process()?;
    let mut destination = T::default();
    parser.decode(&mut destination)?;
    Ok(destination)
}
