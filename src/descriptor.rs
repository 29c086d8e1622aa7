//! Runtime descriptions of decode destinations.
//!
//! A [Descriptor] is a closed description of the shape a decoded value must take. Destination
//! types produce one through [crate::decoder::Decode::descriptor]; the decoder then walks the AST
//! and the descriptor together, so every node/shape combination is decided in one place.
use std::fmt::{Display, Formatter};

use crate::decoder_error;
use crate::errors::{Details, ParserResult};
use crate::pointer::JsonPointer;

/// The scalar destination kinds
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Primitive {
    String,
    Boolean,
    /// An integer destination, along with the range of values it can hold
    Integer { min: i128, max: i128 },
    /// A float destination, along with the width of its significand in bits. Integers only
    /// widen into it when they fit exactly
    Float { mantissa_digits: u32 },
}

/// A single named field within a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// The field's own identifier
    pub name: &'static str,
    /// An explicit JSON key. Takes precedence over `name` when present
    pub tag: Option<&'static str>,
    /// The shape of the field
    pub descriptor: Descriptor,
}

impl Field {
    pub fn new(name: &'static str, tag: Option<&'static str>, descriptor: Descriptor) -> Self {
        Field {
            name,
            tag,
            descriptor,
        }
    }

    /// The object key this field binds to
    pub fn json_key(&self) -> &'static str {
        self.tag.unwrap_or(self.name)
    }
}

/// Description of a destination shape
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Primitive(Primitive),
    /// Accepts any JSON value
    Dynamic,
    /// Keyed collection. The key must be string-like
    Mapping {
        key: Box<Descriptor>,
        value: Box<Descriptor>,
    },
    /// Ordered collection of elements sharing one shape
    Sequence(Box<Descriptor>),
    /// Named fields, in declaration order
    Record(Vec<Field>),
    /// A shape that's only built when the decoder reaches it. Record fields use this, which is
    /// what lets a record contain itself
    Deferred(fn() -> Descriptor),
}

/// Payload-free descriptor classification, used in diagnostics
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DescriptorKind {
    String,
    Boolean,
    Integer,
    Float,
    Dynamic,
    Mapping,
    Sequence,
    Record,
}

impl Display for DescriptorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DescriptorKind::String => write!(f, "string"),
            DescriptorKind::Boolean => write!(f, "boolean"),
            DescriptorKind::Integer => write!(f, "integer"),
            DescriptorKind::Float => write!(f, "float"),
            DescriptorKind::Dynamic => write!(f, "dynamic value"),
            DescriptorKind::Mapping => write!(f, "mapping"),
            DescriptorKind::Sequence => write!(f, "sequence"),
            DescriptorKind::Record => write!(f, "record"),
        }
    }
}

impl Descriptor {
    /// Shorthand for a string primitive
    pub fn string() -> Self {
        Descriptor::Primitive(Primitive::String)
    }

    /// Shorthand for a mapping
    pub fn mapping(key: Descriptor, value: Descriptor) -> Self {
        Descriptor::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Shorthand for a sequence
    pub fn sequence(element: Descriptor) -> Self {
        Descriptor::Sequence(Box::new(element))
    }

    /// The [DescriptorKind] for this descriptor
    pub fn kind(&self) -> DescriptorKind {
        match self {
            Descriptor::Primitive(Primitive::String) => DescriptorKind::String,
            Descriptor::Primitive(Primitive::Boolean) => DescriptorKind::Boolean,
            Descriptor::Primitive(Primitive::Integer { .. }) => DescriptorKind::Integer,
            Descriptor::Primitive(Primitive::Float { .. }) => DescriptorKind::Float,
            Descriptor::Dynamic => DescriptorKind::Dynamic,
            Descriptor::Mapping { .. } => DescriptorKind::Mapping,
            Descriptor::Sequence(_) => DescriptorKind::Sequence,
            Descriptor::Record(_) => DescriptorKind::Record,
            Descriptor::Deferred(build) => build().kind(),
        }
    }

    /// Look up the record field bound to a given object key
    pub fn field(&self, key: &str) -> Option<&Field> {
        match self {
            Descriptor::Record(fields) => fields.iter().find(|f| f.json_key() == key),
            _ => None,
        }
    }

    /// Check that the descriptor is usable before any traversal takes place. Currently this
    /// means every mapping must have a string key. Checking stops at [Descriptor::Deferred]
    /// shapes, which are checked by the decoder as it builds them.
    pub fn validate(&self) -> ParserResult<()> {
        let mut pointer = JsonPointer::default();
        self.validate_at(&mut pointer)
    }

    pub(crate) fn validate_at(&self, pointer: &mut JsonPointer<'_>) -> ParserResult<()> {
        match self {
            Descriptor::Primitive(_) | Descriptor::Dynamic | Descriptor::Deferred(_) => Ok(()),
            Descriptor::Mapping { key, value } => {
                if key.kind() != DescriptorKind::String {
                    return decoder_error!(Details::InvalidMappingKey(key.kind()), pointer);
                }
                value.validate_at(pointer)
            }
            Descriptor::Sequence(element) => element.validate_at(pointer),
            Descriptor::Record(fields) => {
                for field in fields {
                    pointer.push_name(field.json_key());
                    field.descriptor.validate_at(pointer)?;
                    pointer.pop();
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Descriptor, DescriptorKind, Field, Primitive};
    use crate::errors::{Details, ErrorKind};

    fn integer() -> Descriptor {
        Descriptor::Primitive(Primitive::Integer {
            min: i64::MIN as i128,
            max: i64::MAX as i128,
        })
    }

    #[test]
    fn tags_should_take_precedence_over_names() {
        let record = Descriptor::Record(vec![
            Field::new("institution", Some("institution_name"), Descriptor::string()),
            Field::new("degree", None, Descriptor::string()),
        ]);
        assert_eq!(record.field("institution_name").map(|f| f.name), Some("institution"));
        assert!(record.field("institution").is_none());
        assert_eq!(record.field("degree").map(|f| f.name), Some("degree"));
        assert!(record.field("Degree").is_none());
    }

    #[test]
    fn string_keyed_mappings_should_validate() {
        let descriptor = Descriptor::mapping(
            Descriptor::string(),
            Descriptor::sequence(Descriptor::mapping(Descriptor::string(), integer())),
        );
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn non_string_keys_should_fail_validation_with_a_path() {
        let descriptor = Descriptor::Record(vec![Field::new(
            "lookup",
            None,
            Descriptor::mapping(integer(), Descriptor::string()),
        )]);
        let err = descriptor.validate().unwrap_err();
        assert_eq!(err.details, Details::InvalidMappingKey(DescriptorKind::Integer));
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(err.pointer.as_deref(), Some("/lookup"));
    }

    #[test]
    fn deferred_shapes_should_report_the_kind_they_build() {
        fn build() -> Descriptor {
            Descriptor::sequence(Descriptor::Deferred(build))
        }
        let descriptor = Descriptor::Deferred(build);
        assert_eq!(descriptor.kind(), DescriptorKind::Sequence);
        assert!(build().validate().is_ok());
    }
}
