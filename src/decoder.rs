//! Type-directed decoding of an AST into caller-supplied destinations.
//!
//! Decoding runs in two phases:
//!
//! 1. The AST is walked alongside the destination's [Descriptor]. Every node is checked for
//!    compatibility with the shape it's being decoded into and converted into a [Decoded] value.
//!    Nothing is written to the destination during this phase.
//! 2. If (and only if) the whole walk succeeds, the [Decoded] tree is applied to the destination
//!    through [Decode::apply].
//!
//! A failed decode therefore leaves the destination exactly as it was.
//!
//! The permissive policies (unknown object keys are ignored, fields missing from the document keep
//! their current value) are the defaults of [DecoderOptions] and may be switched off.
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::ast::{KeyValuePair, Node};
use crate::coords::Coords;
use crate::decoder_error;
use crate::descriptor::{Descriptor, Primitive};
use crate::errors::{Details, ParserResult};
use crate::pointer::JsonPointer;
use crate::JsonValue;

/// Policy switches for the decoder
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Fail when an object carries a key that no record field binds to
    pub deny_unknown_fields: bool,
    /// Fail when a record field has no corresponding key in the object
    pub deny_missing_fields: bool,
}

impl DecoderOptions {
    /// Options with both strict policies switched on
    pub fn strict() -> Self {
        DecoderOptions {
            deny_unknown_fields: true,
            deny_missing_fields: true,
        }
    }

    pub fn with_deny_unknown_fields(mut self, deny: bool) -> Self {
        self.deny_unknown_fields = deny;
        self
    }

    pub fn with_deny_missing_fields(mut self, deny: bool) -> Self {
        self.deny_missing_fields = deny;
        self
    }
}

/// A value that has been checked against a [Descriptor] and is ready to be applied to a
/// destination
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A JSON null. Typed destinations are left untouched
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// A value for a [Descriptor::Dynamic] destination
    Dynamic(JsonValue),
    /// Entries in document order. Later entries overwrite earlier ones with the same key
    Mapping(Vec<(String, Decoded)>),
    Sequence(Vec<Decoded>),
    /// Values keyed by field identifier, at most one per field
    Record(Vec<(&'static str, Decoded)>),
}

/// Implemented by every type that can act as a decode destination
pub trait Decode {
    /// The shape of this type
    fn descriptor() -> Descriptor;

    /// Write a decoded value into `self`. The value is always one produced against
    /// `Self::descriptor()`, anything else is a [Details::DescriptorMismatch].
    fn apply(&mut self, decoded: Decoded) -> ParserResult<()>;
}

/// The error returned by [Decode::apply] when handed a value of the wrong shape
pub fn descriptor_mismatch<T>() -> ParserResult<T> {
    decoder_error!(Details::DescriptorMismatch)
}

/// Walks an AST against a [Descriptor]
#[derive(Debug, Default, Copy, Clone)]
pub struct Decoder {
    options: DecoderOptions,
}

impl Decoder {
    pub fn new(options: DecoderOptions) -> Self {
        Decoder { options }
    }

    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    /// Decode `root` into `destination`. The destination is only modified if decoding succeeds
    pub fn decode_into<T: Decode>(
        &self,
        root: &Node,
        destination: &mut T,
    ) -> ParserResult<()> {
        let decoded = self.decode_as(root, &T::descriptor())?;
        destination.apply(decoded)
    }

    /// Check and convert `root` against an arbitrary descriptor, without applying it anywhere
    pub fn decode_as(&self, root: &Node, descriptor: &Descriptor) -> ParserResult<Decoded> {
        descriptor.validate()?;
        let mut pointer = JsonPointer::default();
        self.decode_node(root, descriptor, &mut pointer)
    }

    fn decode_node<'a>(
        &self,
        node: &'a Node,
        descriptor: &Descriptor,
        pointer: &mut JsonPointer<'a>,
    ) -> ParserResult<Decoded> {
        match (node, descriptor) {
            (node, Descriptor::Deferred(build)) => {
                let built = build();
                built.validate_at(pointer)?;
                self.decode_node(node, &built, pointer)
            }
            (node, Descriptor::Dynamic) => Ok(Decoded::Dynamic(JsonValue::from(node))),
            (Node::Null(_), _) => Ok(Decoded::Null),

            (Node::String(value, _), Descriptor::Primitive(Primitive::String)) => {
                Ok(Decoded::String(value.clone()))
            }
            (Node::Boolean(value, _), Descriptor::Primitive(Primitive::Boolean)) => {
                Ok(Decoded::Boolean(*value))
            }
            (Node::Integer(value, span), Descriptor::Primitive(Primitive::Integer { min, max })) => {
                if (*min..=*max).contains(&(*value as i128)) {
                    Ok(Decoded::Integer(*value))
                } else {
                    decoder_error!(Details::IntegerOutOfRange(*value), span.start, pointer)
                }
            }
            (Node::Integer(value, span), Descriptor::Primitive(Primitive::Float { mantissa_digits })) => {
                if widens_exactly(*value, *mantissa_digits) {
                    Ok(Decoded::Float(*value as f64))
                } else {
                    decoder_error!(Details::InexactFloat(*value), span.start, pointer)
                }
            }
            (Node::Float(value, _), Descriptor::Primitive(Primitive::Float { .. })) => {
                Ok(Decoded::Float(*value))
            }

            (Node::Array(elements, _), Descriptor::Sequence(element)) => {
                let mut decoded = Vec::with_capacity(elements.len());
                for (index, node) in elements.iter().enumerate() {
                    pointer.push_index(index);
                    decoded.push(self.decode_node(node, element, pointer)?);
                    pointer.pop();
                }
                Ok(Decoded::Sequence(decoded))
            }
            (Node::Object(pairs, _), Descriptor::Mapping { value, .. }) => {
                let mut decoded = Vec::with_capacity(pairs.len());
                for pair in pairs {
                    pointer.push_name(&pair.key);
                    decoded.push((pair.key.clone(), self.decode_node(&pair.value, value, pointer)?));
                    pointer.pop();
                }
                Ok(Decoded::Mapping(decoded))
            }
            (Node::Object(pairs, span), Descriptor::Record(_)) => {
                self.decode_record(pairs, descriptor, pointer, span.start)
            }

            (node, descriptor) => decoder_error!(
                Details::TypeMismatch {
                    expected: descriptor.kind(),
                    found: node.kind()
                },
                node.span().start,
                pointer
            ),
        }
    }

    /// Bind object pairs to record fields by JSON key. Every pair is checked, but only the last
    /// occurrence of a duplicated key is kept, so nothing from earlier occurrences reaches the
    /// destination.
    fn decode_record<'a>(
        &self,
        pairs: &'a [KeyValuePair],
        descriptor: &Descriptor,
        pointer: &mut JsonPointer<'a>,
        at: Coords,
    ) -> ParserResult<Decoded> {
        let mut decoded = Vec::with_capacity(pairs.len());
        for pair in pairs {
            pointer.push_name(&pair.key);
            match descriptor.field(&pair.key) {
                Some(field) => {
                    let value = self.decode_node(&pair.value, &field.descriptor, pointer)?;
                    match decoded.iter_mut().find(|(name, _)| *name == field.name) {
                        Some(entry) => entry.1 = value,
                        None => decoded.push((field.name, value)),
                    }
                }
                None if self.options.deny_unknown_fields => {
                    return decoder_error!(
                        Details::UnknownField(pair.key.clone()),
                        pair.key_span.start,
                        pointer
                    );
                }
                None => (),
            }
            pointer.pop();
        }

        if self.options.deny_missing_fields {
            if let Descriptor::Record(fields) = descriptor {
                if let Some(missing) = fields
                    .iter()
                    .find(|f| !pairs.iter().any(|p| p.key == f.json_key()))
                {
                    return decoder_error!(
                        Details::MissingField(missing.json_key().to_string()),
                        at,
                        pointer
                    );
                }
            }
        }

        Ok(Decoded::Record(decoded))
    }
}

impl Decode for String {
    fn descriptor() -> Descriptor {
        Descriptor::Primitive(Primitive::String)
    }

    fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
        match decoded {
            Decoded::Null => Ok(()),
            Decoded::String(value) => {
                *self = value;
                Ok(())
            }
            _ => descriptor_mismatch(),
        }
    }
}

impl Decode for bool {
    fn descriptor() -> Descriptor {
        Descriptor::Primitive(Primitive::Boolean)
    }

    fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
        match decoded {
            Decoded::Null => Ok(()),
            Decoded::Boolean(value) => {
                *self = value;
                Ok(())
            }
            _ => descriptor_mismatch(),
        }
    }
}

/// Implement [Decode] for the built-in integer types, each advertising its own range
macro_rules! decode_integer {
    ($($t:ty),*) => {
        $(
            impl Decode for $t {
                fn descriptor() -> Descriptor {
                    Descriptor::Primitive(Primitive::Integer {
                        min: <$t>::MIN as i128,
                        max: <$t>::MAX as i128,
                    })
                }

                fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
                    match decoded {
                        Decoded::Null => Ok(()),
                        Decoded::Integer(value) => match <$t>::try_from(value) {
                            Ok(value) => {
                                *self = value;
                                Ok(())
                            }
                            Err(_) => decoder_error!(Details::IntegerOutOfRange(value)),
                        },
                        _ => descriptor_mismatch(),
                    }
                }
            }
        )*
    };
}

decode_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Whether an integer survives conversion into a float with a `mantissa_digits` wide significand
fn widens_exactly(value: i64, mantissa_digits: u32) -> bool {
    let magnitude = value.unsigned_abs();
    magnitude == 0 || (magnitude >> magnitude.trailing_zeros()) >> mantissa_digits == 0
}

/// Implement [Decode] for the built-in float types. Float literals are rounded to the nearest
/// value of the destination type; integers must fit exactly
macro_rules! decode_float {
    ($($t:ty),*) => {
        $(
            impl Decode for $t {
                fn descriptor() -> Descriptor {
                    Descriptor::Primitive(Primitive::Float {
                        mantissa_digits: <$t>::MANTISSA_DIGITS,
                    })
                }

                fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
                    match decoded {
                        Decoded::Null => Ok(()),
                        Decoded::Float(value) => {
                            *self = value as $t;
                            Ok(())
                        }
                        _ => descriptor_mismatch(),
                    }
                }
            }
        )*
    };
}

decode_float!(f32, f64);

impl Decode for JsonValue {
    fn descriptor() -> Descriptor {
        Descriptor::Dynamic
    }

    fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
        match decoded {
            Decoded::Null => {
                *self = JsonValue::Null;
                Ok(())
            }
            Decoded::Dynamic(value) => {
                *self = value;
                Ok(())
            }
            _ => descriptor_mismatch(),
        }
    }
}

/// `None` stays `None` on a null; any other value lands in `Some`
impl<T: Decode + Default> Decode for Option<T> {
    fn descriptor() -> Descriptor {
        T::descriptor()
    }

    fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
        match decoded {
            Decoded::Null => Ok(()),
            decoded => self.get_or_insert_with(T::default).apply(decoded),
        }
    }
}

impl<T: Decode> Decode for Box<T> {
    fn descriptor() -> Descriptor {
        T::descriptor()
    }

    fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
        self.as_mut().apply(decoded)
    }
}

/// The sequence is resized to the decoded length; surviving elements are decoded into in place
impl<T: Decode + Default> Decode for Vec<T> {
    fn descriptor() -> Descriptor {
        Descriptor::sequence(T::descriptor())
    }

    fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
        match decoded {
            Decoded::Null => Ok(()),
            Decoded::Sequence(elements) => {
                self.resize_with(elements.len(), T::default);
                for (slot, element) in self.iter_mut().zip(elements) {
                    slot.apply(element)?;
                }
                Ok(())
            }
            _ => descriptor_mismatch(),
        }
    }
}

/// Build a fresh key from a decoded mapping entry
fn decode_key<K: Decode + Default>(key: String) -> ParserResult<K> {
    let mut decoded = K::default();
    decoded.apply(Decoded::String(key))?;
    Ok(decoded)
}

/// Build a fresh value from a decoded mapping entry
fn decode_value<V: Decode + Default>(value: Decoded) -> ParserResult<V> {
    let mut decoded = V::default();
    decoded.apply(value)?;
    Ok(decoded)
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Default + Eq + Hash,
    V: Decode + Default,
    S: BuildHasher,
{
    fn descriptor() -> Descriptor {
        Descriptor::mapping(K::descriptor(), V::descriptor())
    }

    fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
        match decoded {
            Decoded::Null => Ok(()),
            Decoded::Mapping(entries) => {
                for (key, value) in entries {
                    self.insert(decode_key(key)?, decode_value(value)?);
                }
                Ok(())
            }
            _ => descriptor_mismatch(),
        }
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Default + Ord,
    V: Decode + Default,
{
    fn descriptor() -> Descriptor {
        Descriptor::mapping(K::descriptor(), V::descriptor())
    }

    fn apply(&mut self, decoded: Decoded) -> ParserResult<()> {
        match decoded {
            Decoded::Null => Ok(()),
            Decoded::Mapping(entries) => {
                for (key, value) in entries {
                    self.insert(decode_key(key)?, decode_value(value)?);
                }
                Ok(())
            }
            _ => descriptor_mismatch(),
        }
    }
}

/// Implement [Decode] for a struct, binding each listed field to an object key. A field binds to
/// its own name unless an explicit key is given after `=>`. Fields that aren't listed are never
/// touched by decoding.
///
/// ```
/// use json_shape::decode_record;
///
/// #[derive(Debug, Default)]
/// struct Education {
///     institution: String,
///     degree: String,
/// }
///
/// decode_record!(Education {
///     institution: String => "institution_name",
///     degree: String,
/// });
///
/// let education: Education =
///     json_shape::from_str(r#"{"institution_name": "X", "degree": "Y"}"#).unwrap();
/// assert_eq!(education.institution, "X");
/// assert_eq!(education.degree, "Y");
/// ```
#[macro_export]
macro_rules! decode_record {
    ($record:ty { $($field:ident : $ty:ty $(=> $tag:literal)?),* $(,)? }) => {
        impl $crate::decoder::Decode for $record {
            fn descriptor() -> $crate::descriptor::Descriptor {
                $crate::descriptor::Descriptor::Record(vec![
                    $(
                        $crate::descriptor::Field::new(
                            stringify!($field),
                            $crate::decode_record!(@tag $($tag)?),
                            $crate::descriptor::Descriptor::Deferred(
                                <$ty as $crate::decoder::Decode>::descriptor,
                            ),
                        ),
                    )*
                ])
            }

            fn apply(
                &mut self,
                decoded: $crate::decoder::Decoded,
            ) -> $crate::errors::ParserResult<()> {
                match decoded {
                    $crate::decoder::Decoded::Null => Ok(()),
                    $crate::decoder::Decoded::Record(fields) => {
                        for (name, value) in fields {
                            $(
                                if name == stringify!($field) {
                                    $crate::decoder::Decode::apply(&mut self.$field, value)?;
                                    continue;
                                }
                            )*
                            let _ = (name, value);
                            return $crate::decoder::descriptor_mismatch();
                        }
                        Ok(())
                    }
                    _ => $crate::decoder::descriptor_mismatch(),
                }
            }
        }
    };
    (@tag) => {
        None
    };
    (@tag $tag:literal) => {
        Some($tag)
    };
}
