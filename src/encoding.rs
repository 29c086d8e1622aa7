//! The lexer operates over a buffer of `char`s. When the input arrives as raw bytes (a file, a
//! socket, a byte slice) those bytes are first run through one of the `chisel-decoders` char
//! decoders, selected by an [Encoding].
use std::fmt::{Display, Formatter};
use std::io::BufRead;

use chisel_decoders::common::DecoderErrorCode;
use chisel_decoders::{ascii::AsciiDecoder, utf8::Utf8Decoder};

use crate::errors::Details;

/// Enumeration of different supported encoding types
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::Utf8 => write!(f, "UTF-8"),
            Encoding::Ascii => write!(f, "ASCII"),
        }
    }
}

/// The characters decoded from a byte source
#[derive(Debug, Default)]
pub(crate) struct DecodedInput {
    /// Everything up to the end of input, or up to the first bad byte sequence
    pub chars: Vec<char>,
    /// Set when decoding stopped on a bad byte sequence rather than at the end of the input
    pub failure: Option<Details>,
}

/// Pull chars out of a decoder until it reports end of input or a failure
macro_rules! drain_decoder {
    ($decoder : expr, $encoding : expr) => {{
        let mut decoder = $decoder;
        let mut input = DecodedInput::default();
        loop {
            match decoder.decode_next() {
                Ok(c) => input.chars.push(c),
                Err(err) => match err.code {
                    DecoderErrorCode::EndOfInput => break,
                    _ => {
                        input.failure = Some(Details::InvalidByteSequence($encoding));
                        break;
                    }
                },
            }
        }
        input
    }};
}

/// Drain a reader through the decoder for `encoding`
pub(crate) fn decode_chars<Buffer: BufRead>(
    buffer: &mut Buffer,
    encoding: Encoding,
) -> DecodedInput {
    match encoding {
        Encoding::Utf8 => drain_decoder!(Utf8Decoder::new(buffer), encoding),
        Encoding::Ascii => drain_decoder!(AsciiDecoder::new(buffer), encoding),
    }
}
