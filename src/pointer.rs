//! An RFC 6901 JSON pointer, used by the decoder to say *where* in a document a failure happened
use std::{borrow::Cow, fmt::Display};

/// Escaped form of `~` within a name
const ENCODED_TILDE: &str = "~0";
/// Escaped form of `/` within a name
const ENCODED_SLASH: &str = "~1";

/// A single reference token within a pointer
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPointerComponent<'a> {
    /// An object member name
    Name(Cow<'a, str>),
    /// An array index
    Index(usize),
}

impl<'a> Display for JsonPointerComponent<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name(s) => write!(
                f,
                "{}",
                s.replace('~', ENCODED_TILDE).replace('/', ENCODED_SLASH)
            ),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A complete pointer. The decoder pushes a component on the way down into a container and pops
/// it on the way back up, so at any point the pointer addresses the value being decoded.
#[derive(Debug, Default, Clone)]
pub struct JsonPointer<'a> {
    components: Vec<JsonPointerComponent<'a>>,
}

impl<'a> JsonPointer<'a> {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Checks whether the pointer addresses the whole document
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Descend into an object member
    pub fn push_name(&mut self, name: &'a str) {
        self.components
            .push(JsonPointerComponent::Name(Cow::Borrowed(name)))
    }

    /// Descend into an array element
    pub fn push_index(&mut self, index: usize) {
        self.components.push(JsonPointerComponent::Index(index))
    }

    /// Pop the last component off the back of the pointer
    pub fn pop(&mut self) -> Option<JsonPointerComponent<'a>> {
        self.components.pop()
    }

    /// Serialise the pointer into a string representation that's compliant with RFC 6901. The
    /// whole document is addressed by the empty string
    pub fn as_str(&self) -> Cow<'a, str> {
        Cow::Owned(
            self.components
                .iter()
                .map(|c| format!("/{}", c))
                .collect::<String>(),
        )
    }
}

impl<'a> Display for JsonPointer<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
