use super::fundamental_type::FundamentalType;
use crate::core::io::codec::{self, prefixed_len};
use crate::core::io::traits::{WireDecode, WireEncode};
use crate::engine::error::{JobError, Result};
use std::fmt;
use std::io::{Read, Write};

/// A single typed job argument.
///
/// Each variant owns its payload, so the tag can never disagree with the
/// stored value and cloning an argument always produces independent storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Argument {
    /// An argument slot that has not been set yet.
    #[default]
    None,
    Text(String),
    Integer(i32),
    Float(f32),
    Bool(bool),
    Long(i64),
    Double(f64),
    Char(u8),
    VariableLength(Vec<u8>),
    UnsignedInteger(u32),
}

/// A Rust type that can be stored in, and read back from, an [`Argument`].
///
/// The associated `TYPE` is the tag an argument carries after storing a value
/// of this type, and the tag [`Argument::get`] requires before handing one
/// back.
pub trait ArgumentValue: Sized {
    const TYPE: FundamentalType;

    fn into_argument(self) -> Argument;

    /// Returns a copy of the stored value if `arg` holds this type.
    fn from_argument(arg: &Argument) -> Option<Self>;
}

macro_rules! impl_argument_value {
    ($ty:ty, $variant:ident, $tag:ident) => {
        impl ArgumentValue for $ty {
            const TYPE: FundamentalType = FundamentalType::$tag;

            fn into_argument(self) -> Argument {
                Argument::$variant(self)
            }

            fn from_argument(arg: &Argument) -> Option<Self> {
                match arg {
                    Argument::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Argument {
            fn from(value: $ty) -> Self {
                Argument::$variant(value)
            }
        }
    };
}

impl_argument_value!(String, Text, Text);
impl_argument_value!(i32, Integer, Integer);
impl_argument_value!(f32, Float, Float);
impl_argument_value!(bool, Bool, Bool);
impl_argument_value!(i64, Long, Long);
impl_argument_value!(f64, Double, Double);
impl_argument_value!(u8, Char, Char);
impl_argument_value!(Vec<u8>, VariableLength, VariableLength);
impl_argument_value!(u32, UnsignedInteger, UnsignedInteger);

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<&[u8]> for Argument {
    fn from(value: &[u8]) -> Self {
        Argument::VariableLength(value.to_vec())
    }
}

impl Argument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tag describing the stored value.
    pub fn fundamental_type(&self) -> FundamentalType {
        match self {
            Argument::None => FundamentalType::None,
            Argument::Text(_) => FundamentalType::Text,
            Argument::Integer(_) => FundamentalType::Integer,
            Argument::Float(_) => FundamentalType::Float,
            Argument::Bool(_) => FundamentalType::Bool,
            Argument::Long(_) => FundamentalType::Long,
            Argument::Double(_) => FundamentalType::Double,
            Argument::Char(_) => FundamentalType::Char,
            Argument::VariableLength(_) => FundamentalType::VariableLength,
            Argument::UnsignedInteger(_) => FundamentalType::UnsignedInteger,
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Argument::None)
    }

    /// Replaces the stored value, and with it the tag.
    pub fn set(&mut self, value: impl Into<Argument>) {
        *self = value.into();
    }

    /// Returns a copy of the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::TypeMismatch`] if the stored tag is not `T::TYPE`.
    pub fn get<T: ArgumentValue>(&self) -> Result<T> {
        T::from_argument(self).ok_or_else(|| self.mismatch(T::TYPE))
    }

    /// Checks that the stored tag is `expected`.
    pub fn expect_type(&self, expected: FundamentalType) -> Result<()> {
        if self.fundamental_type() == expected {
            Ok(())
        } else {
            Err(self.mismatch(expected))
        }
    }

    fn mismatch(&self, expected: FundamentalType) -> JobError {
        JobError::TypeMismatch {
            expected,
            found: self.fundamental_type(),
        }
    }

    pub fn set_text(&mut self, value: impl Into<String>) {
        *self = Argument::Text(value.into());
    }

    pub fn set_integer(&mut self, value: i32) {
        *self = Argument::Integer(value);
    }

    pub fn set_float(&mut self, value: f32) {
        *self = Argument::Float(value);
    }

    pub fn set_bool(&mut self, value: bool) {
        *self = Argument::Bool(value);
    }

    pub fn set_long(&mut self, value: i64) {
        *self = Argument::Long(value);
    }

    pub fn set_double(&mut self, value: f64) {
        *self = Argument::Double(value);
    }

    pub fn set_char(&mut self, value: u8) {
        *self = Argument::Char(value);
    }

    pub fn set_bytes(&mut self, value: impl Into<Vec<u8>>) {
        *self = Argument::VariableLength(value.into());
    }

    pub fn set_unsigned_integer(&mut self, value: u32) {
        *self = Argument::UnsignedInteger(value);
    }

    /// Borrows the stored text without copying it.
    pub fn text(&self) -> Result<&str> {
        match self {
            Argument::Text(s) => Ok(s),
            _ => Err(self.mismatch(FundamentalType::Text)),
        }
    }

    /// Borrows the stored raw bytes without copying them.
    pub fn bytes(&self) -> Result<&[u8]> {
        match self {
            Argument::VariableLength(b) => Ok(b),
            _ => Err(self.mismatch(FundamentalType::VariableLength)),
        }
    }

    pub fn integer(&self) -> Result<i32> {
        self.get()
    }

    pub fn float(&self) -> Result<f32> {
        self.get()
    }

    pub fn boolean(&self) -> Result<bool> {
        self.get()
    }

    pub fn long(&self) -> Result<i64> {
        self.get()
    }

    pub fn double(&self) -> Result<f64> {
        self.get()
    }

    pub fn char(&self) -> Result<u8> {
        self.get()
    }

    pub fn unsigned_integer(&self) -> Result<u32> {
        self.get()
    }

    fn payload_size(&self) -> usize {
        match self {
            Argument::Text(s) => prefixed_len(s.len()),
            Argument::VariableLength(b) => prefixed_len(b.len()),
            other => other.fundamental_type().payload_width().unwrap_or_default(),
        }
    }
}

impl WireEncode for Argument {
    /// One tag byte plus the payload.
    fn encoded_size(&self) -> usize {
        1 + self.payload_size()
    }

    fn write_body(&self, writer: &mut impl Write) -> Result<()> {
        codec::write_u8(writer, self.fundamental_type().as_byte())?;
        match self {
            Argument::None => Ok(()),
            Argument::Text(s) => codec::write_text(writer, s),
            Argument::Integer(v) => codec::write_i32(writer, *v),
            Argument::Float(v) => codec::write_f32(writer, *v),
            Argument::Bool(v) => codec::write_bool(writer, *v),
            Argument::Long(v) => codec::write_i64(writer, *v),
            Argument::Double(v) => codec::write_f64(writer, *v),
            Argument::Char(v) => codec::write_u8(writer, *v),
            Argument::VariableLength(b) => codec::write_bytes(writer, b),
            Argument::UnsignedInteger(v) => codec::write_u32(writer, *v),
        }
    }
}

impl WireDecode for Argument {
    fn decode(reader: &mut impl Read) -> Result<Self> {
        let tag = FundamentalType::try_from(codec::read_u8(reader)?)?;
        Ok(match tag {
            FundamentalType::None => Argument::None,
            FundamentalType::Text => Argument::Text(codec::read_text(reader)?),
            FundamentalType::Integer => Argument::Integer(codec::read_i32(reader)?),
            FundamentalType::Float => Argument::Float(codec::read_f32(reader)?),
            FundamentalType::Bool => Argument::Bool(codec::read_bool(reader)?),
            FundamentalType::Long => Argument::Long(codec::read_i64(reader)?),
            FundamentalType::Double => Argument::Double(codec::read_f64(reader)?),
            FundamentalType::Char => Argument::Char(codec::read_u8(reader)?),
            FundamentalType::VariableLength => {
                Argument::VariableLength(codec::read_bytes(reader)?)
            }
            FundamentalType::UnsignedInteger => {
                Argument::UnsignedInteger(codec::read_u32(reader)?)
            }
        })
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::None => f.write_str("<unset>"),
            Argument::Text(s) => write!(f, "{:?}", s),
            Argument::Integer(v) => write!(f, "{}", v),
            Argument::Float(v) => write!(f, "{}", v),
            Argument::Bool(v) => write!(f, "{}", v),
            Argument::Long(v) => write!(f, "{}", v),
            Argument::Double(v) => write!(f, "{}", v),
            Argument::Char(v) => write!(f, "'{}'", v.escape_ascii()),
            Argument::VariableLength(b) => write!(f, "<{} bytes>", b.len()),
            Argument::UnsignedInteger(v) => write!(f, "{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_argument_is_unset() {
        let arg = Argument::new();
        assert_eq!(arg.fundamental_type(), FundamentalType::None);
        assert!(!arg.is_set());
        assert_eq!(arg.encoded_size(), 1);
    }

    #[test]
    fn text_round_trips_through_set_and_get() {
        let mut arg = Argument::new();
        arg.set_text("test_string");
        assert_eq!(arg.fundamental_type(), FundamentalType::Text);
        assert_eq!(arg.text().unwrap(), "test_string");
        assert_eq!(arg.get::<String>().unwrap(), "test_string");
    }

    #[test]
    fn integer_round_trips_through_set_and_get() {
        let mut arg = Argument::new();
        arg.set(42i32);
        assert_eq!(arg.fundamental_type(), FundamentalType::Integer);
        assert_eq!(arg.integer().unwrap(), 42);
    }

    #[test]
    fn float_round_trips_through_set_and_get() {
        let mut arg = Argument::new();
        arg.set_float(3.14);
        assert_eq!(arg.fundamental_type(), FundamentalType::Float);
        assert_eq!(arg.float().unwrap(), 3.14f32);
    }

    #[test]
    fn bool_round_trips_through_set_and_get() {
        let mut arg = Argument::new();
        arg.set_bool(true);
        assert_eq!(arg.fundamental_type(), FundamentalType::Bool);
        assert!(arg.boolean().unwrap());

        arg.set_bool(false);
        assert!(!arg.boolean().unwrap());
    }

    #[test]
    fn remaining_types_round_trip() {
        let mut arg = Argument::new();
        arg.set_long(-9_000_000_000);
        assert_eq!(arg.long().unwrap(), -9_000_000_000);
        arg.set_double(2.5e-12);
        assert_eq!(arg.double().unwrap(), 2.5e-12);
        arg.set_char(b'x');
        assert_eq!(arg.char().unwrap(), b'x');
        arg.set_unsigned_integer(u32::MAX);
        assert_eq!(arg.unsigned_integer().unwrap(), u32::MAX);
        arg.set_bytes(vec![1, 2, 3]);
        assert_eq!(arg.bytes().unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn get_with_mismatched_type_fails_without_reinterpreting() {
        let mut arg = Argument::new();
        arg.set_float(1.0);
        let err = arg.integer().unwrap_err();
        assert!(matches!(
            err,
            JobError::TypeMismatch {
                expected: FundamentalType::Integer,
                found: FundamentalType::Float
            }
        ));
        assert!(arg.text().is_err());
        assert!(Argument::new().boolean().is_err());
    }

    #[test]
    fn set_replaces_previous_value_and_tag() {
        let mut arg = Argument::from("long text value");
        arg.set(7u32);
        assert_eq!(arg, Argument::UnsignedInteger(7));
        assert!(arg.text().is_err());
    }

    #[test]
    fn encoded_sizes_match_wire_layout() {
        let mut arg = Argument::new();
        arg.set_text("test");
        assert_eq!(arg.encoded_size(), 1 + 4 + 4);
        arg.set_integer(42);
        assert_eq!(arg.encoded_size(), 1 + 4);
        arg.set_float(3.14);
        assert_eq!(arg.encoded_size(), 1 + 4);
        arg.set_bool(true);
        assert_eq!(arg.encoded_size(), 1 + 1);
        arg.set_long(1);
        assert_eq!(arg.encoded_size(), 1 + 8);
        arg.set_double(1.0);
        assert_eq!(arg.encoded_size(), 1 + 8);
        arg.set_char(b'a');
        assert_eq!(arg.encoded_size(), 1 + 1);
        arg.set_bytes(vec![0; 10]);
        assert_eq!(arg.encoded_size(), 1 + 4 + 10);
    }

    #[test]
    fn encoding_writes_tag_then_length_then_bytes() {
        let bytes = Argument::from("ab").to_bytes().unwrap();
        assert_eq!(
            bytes,
            vec![FundamentalType::Text.as_byte(), 2, 0, 0, 0, b'a', b'b']
        );
    }

    #[test]
    fn encoded_length_equals_encoded_size_for_every_type() {
        let samples = vec![
            Argument::None,
            Argument::from("μ-grid"),
            Argument::from(-3i32),
            Argument::from(0.5f32),
            Argument::from(true),
            Argument::from(1i64 << 40),
            Argument::from(std::f64::consts::PI),
            Argument::from(b'z'),
            Argument::from(vec![9u8; 33]),
            Argument::from(17u32),
        ];
        for arg in samples {
            let bytes = arg.to_bytes().unwrap();
            assert_eq!(bytes.len(), arg.encoded_size(), "size mismatch for {:?}", arg);
            assert_eq!(Argument::from_bytes(&bytes).unwrap(), arg);
        }
    }

    #[test]
    fn decode_rejects_unknown_tag() {
        assert!(matches!(
            Argument::from_bytes(&[42]),
            Err(JobError::UnknownTypeTag(42))
        ));
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = Argument::from(1i32).to_bytes().unwrap();
        bytes.push(0);
        assert!(matches!(
            Argument::from_bytes(&bytes),
            Err(JobError::FrameLengthMismatch { .. })
        ));
    }

    #[test]
    fn clone_owns_independent_storage() {
        let original = Argument::from("shared?");
        let mut copy = original.clone();
        copy.set_text("changed");
        assert_eq!(original.text().unwrap(), "shared?");
        assert_eq!(copy.text().unwrap(), "changed");
    }

    #[test]
    fn display_formats_values() {
        assert_eq!(Argument::from("a").to_string(), "\"a\"");
        assert_eq!(Argument::from(5i32).to_string(), "5");
        assert_eq!(Argument::from(vec![0u8; 3]).to_string(), "<3 bytes>");
        assert_eq!(Argument::None.to_string(), "<unset>");
    }
}
