//! The abstract syntax tree produced by the parser.
//!
//! Every node keeps the [Span] of the token(s) it was built from, so that the decoder can report
//! where in the input an incompatible value lives. Numeric nodes keep the integer/float tag the
//! lexer assigned; nothing downstream re-derives it from the value.
use std::fmt::{Display, Formatter};

use crate::coords::Span;

/// A single JSON value within a parsed document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    String(String, Span),
    Integer(i64, Span),
    Float(f64, Span),
    Boolean(bool, Span),
    Null(Span),
    /// Elements in document order
    Array(Vec<Node>, Span),
    /// Pairs in document order, duplicate keys included
    Object(Vec<KeyValuePair>, Span),
}

/// A single `key: value` entry within an object
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    /// The key
    pub key: String,
    /// Span of the key's string token
    pub key_span: Span,
    /// The value
    pub value: Node,
}

/// The closed set of node kinds
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NodeKind {
    String,
    Integer,
    Float,
    Boolean,
    Null,
    Array,
    Object,
    KeyValuePair,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::String => write!(f, "string"),
            NodeKind::Integer => write!(f, "integer"),
            NodeKind::Float => write!(f, "float"),
            NodeKind::Boolean => write!(f, "boolean"),
            NodeKind::Null => write!(f, "null"),
            NodeKind::Array => write!(f, "array"),
            NodeKind::Object => write!(f, "object"),
            NodeKind::KeyValuePair => write!(f, "key/value pair"),
        }
    }
}

impl Node {
    /// The [NodeKind] of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::String(..) => NodeKind::String,
            Node::Integer(..) => NodeKind::Integer,
            Node::Float(..) => NodeKind::Float,
            Node::Boolean(..) => NodeKind::Boolean,
            Node::Null(_) => NodeKind::Null,
            Node::Array(..) => NodeKind::Array,
            Node::Object(..) => NodeKind::Object,
        }
    }

    /// The input span covered by this node
    pub fn span(&self) -> Span {
        match self {
            Node::String(_, span)
            | Node::Integer(_, span)
            | Node::Float(_, span)
            | Node::Boolean(_, span)
            | Node::Null(span)
            | Node::Array(_, span)
            | Node::Object(_, span) => *span,
        }
    }

    /// For an object, the value of the *last* pair with the given key
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Object(pairs, _) => pairs
                .iter()
                .rev()
                .find(|pair| pair.key == key)
                .map(|pair| &pair.value),
            _ => None,
        }
    }

    /// For an array, the element at a given index
    pub fn index(&self, index: usize) -> Option<&Node> {
        match self {
            Node::Array(elements, _) => elements.get(index),
            _ => None,
        }
    }

    /// Nesting depth of the tree rooted at this node. Scalars have a depth of 1
    pub fn depth(&self) -> usize {
        match self {
            Node::Array(elements, _) => 1 + elements.iter().map(Node::depth).max().unwrap_or(0),
            Node::Object(pairs, _) => {
                1 + pairs.iter().map(|p| p.value.depth()).max().unwrap_or(0)
            }
            _ => 1,
        }
    }
}

impl KeyValuePair {
    pub fn kind(&self) -> NodeKind {
        NodeKind::KeyValuePair
    }

    /// Span running from the start of the key to the end of the value
    pub fn span(&self) -> Span {
        self.key_span.merge(&self.value.span())
    }
}

/// Compact rendering, intended for diagnostics rather than as an encoder
impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::String(value, _) => write!(f, "{:?}", value),
            Node::Integer(value, _) => write!(f, "{}", value),
            Node::Float(value, _) => write!(f, "{:?}", value),
            Node::Boolean(value, _) => write!(f, "{}", value),
            Node::Null(_) => write!(f, "null"),
            Node::Array(elements, _) => {
                write!(f, "[")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Node::Object(pairs, _) => {
                write!(f, "{{")?;
                for (index, pair) in pairs.iter().enumerate() {
                    if index > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", pair)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Display for KeyValuePair {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}:{}", self.key, self.value)
    }
}
