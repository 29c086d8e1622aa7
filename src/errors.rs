//! General error types shared by the lexer, parser and decoder stages

use std::fmt::{Display, Formatter};

use thiserror::Error as ThisError;

use crate::ast::NodeKind;
use crate::coords::Coords;
use crate::descriptor::DescriptorKind;
use crate::encoding::Encoding;
use crate::lexer::TokenKind;

/// Global result type used throughout the engine
pub type ParserResult<T> = Result<T, Error>;

/// Enumeration of the various different stages that can produce an error
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    /// The lexer stage
    Lexer,
    /// The parsing/AST construction stage
    Parser,
    /// The type-directed decoding stage
    Decoder,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Lexer => write!(f, "lexer"),
            Stage::Parser => write!(f, "parser"),
            Stage::Decoder => write!(f, "decoder"),
        }
    }
}

/// Broad classification of an [Error], independent of the stage that raised it
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid character, literal, string or number in the input
    Lexical,
    /// Well-formed tokens in an order the JSON grammar doesn't allow
    Syntax,
    /// An AST node that doesn't fit the destination shape
    DecodeType,
    /// The engine was driven incorrectly, or the destination descriptor is unusable
    Precondition,
}

/// A global enumeration of error details
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Details {
    #[error("invalid character found: '{0}'")]
    InvalidCharacter(char),
    #[error("invalid literal found: '{0}'")]
    InvalidLiteral(String),
    #[error("invalid number found: '{0}'")]
    InvalidNumericRepresentation(String),
    #[error("invalid escape sequence found: '{0}'")]
    InvalidEscapeSequence(String),
    #[error("invalid unicode escape sequence found: '{0}'")]
    InvalidUnicodeEscapeSequence(String),
    #[error("unescaped control character {0:?} found whilst parsing string")]
    ControlCharacterInString(char),
    #[error("end of input found whilst parsing string")]
    UnterminatedString,
    #[error("input isn't valid {0}")]
    InvalidByteSequence(Encoding),
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
    },
    #[error("unexpected {0} after the top-level value")]
    TrailingContent(TokenKind),
    #[error("cannot decode {found} into {expected}")]
    TypeMismatch {
        expected: DescriptorKind,
        found: NodeKind,
    },
    #[error("integer {0} is out of range for the destination")]
    IntegerOutOfRange(i64),
    #[error("integer {0} has no exact representation in the destination float")]
    InexactFloat(i64),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("missing field '{0}'")]
    MissingField(String),
    #[error("decode called before a successful process")]
    NotProcessed,
    #[error("process may only be called once per instance")]
    AlreadyProcessed,
    #[error("mapping keys must be string-like, found {0}")]
    InvalidMappingKey(DescriptorKind),
    #[error("decoded value doesn't match the destination descriptor")]
    DescriptorMismatch,
}

impl Details {
    /// Classify the details into an [ErrorKind]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Details::InvalidCharacter(_)
            | Details::InvalidLiteral(_)
            | Details::InvalidNumericRepresentation(_)
            | Details::InvalidEscapeSequence(_)
            | Details::InvalidUnicodeEscapeSequence(_)
            | Details::ControlCharacterInString(_)
            | Details::UnterminatedString
            | Details::InvalidByteSequence(_) => ErrorKind::Lexical,
            Details::UnexpectedToken { .. } | Details::TrailingContent(_) => ErrorKind::Syntax,
            Details::TypeMismatch { .. }
            | Details::IntegerOutOfRange(_)
            | Details::InexactFloat(_)
            | Details::UnknownField(_)
            | Details::MissingField(_) => ErrorKind::DecodeType,
            Details::NotProcessed
            | Details::AlreadyProcessed
            | Details::InvalidMappingKey(_)
            | Details::DescriptorMismatch => ErrorKind::Precondition,
        }
    }
}

/// The general error structure
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The originating stage for the error
    pub stage: Stage,
    /// The global error code for the error
    pub details: Details,
    /// Optional input coordinates
    pub coords: Option<Coords>,
    /// Optional JSON pointer to the offending value, populated by the decoder
    pub pointer: Option<String>,
}

impl Error {
    /// Shortcut for `self.details.kind()`
    pub fn kind(&self) -> ErrorKind {
        self.details.kind()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.stage, self.details)?;
        if let Some(pointer) = &self.pointer {
            write!(f, " at '{}'", pointer)?;
        }
        if let Some(coords) = &self.coords {
            write!(f, " {}", coords)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[macro_export]
macro_rules! lexer_error {
    ($details: expr, $coords: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Lexer,
            details: $details,
            coords: Some($coords),
            pointer: None,
        })
    };
}

#[macro_export]
macro_rules! parser_error {
    ($details: expr, $coords: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Parser,
            details: $details,
            coords: Some($coords),
            pointer: None,
        })
    };
    ($details: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Parser,
            details: $details,
            coords: None,
            pointer: None,
        })
    };
}

#[macro_export]
macro_rules! decoder_error {
    ($details: expr, $coords: expr, $pointer: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Decoder,
            details: $details,
            coords: Some($coords),
            pointer: Some($pointer.to_string()),
        })
    };
    ($details: expr, $pointer: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Decoder,
            details: $details,
            coords: None,
            pointer: Some($pointer.to_string()),
        })
    };
    ($details: expr) => {
        Err($crate::errors::Error {
            stage: $crate::errors::Stage::Decoder,
            details: $details,
            coords: None,
            pointer: None,
        })
    };
}
