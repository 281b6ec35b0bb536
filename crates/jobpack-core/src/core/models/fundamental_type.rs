use crate::engine::error::JobError;
use std::fmt;

/// The runtime type of a job argument.
///
/// The discriminant is the tag byte written in front of every argument on the
/// wire, so the representation is pinned to `u8` and the values are part of
/// the protocol. New variants must take unassigned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum FundamentalType {
    /// An unset argument slot. Carries no payload.
    #[default]
    None = 0,
    /// UTF-8 text, length-prefixed.
    Text = 1,
    /// Signed 32-bit integer.
    Integer = 2,
    /// 32-bit IEEE float.
    Float = 3,
    /// Boolean stored as a single byte.
    Bool = 4,
    /// Signed 64-bit integer.
    Long = 5,
    /// 64-bit IEEE float.
    Double = 6,
    /// A single byte character.
    Char = 7,
    /// Raw bytes, length-prefixed.
    VariableLength = 8,
    /// Unsigned 32-bit integer.
    UnsignedInteger = 9,
}

impl FundamentalType {
    pub const ALL: [FundamentalType; 10] = [
        FundamentalType::None,
        FundamentalType::Text,
        FundamentalType::Integer,
        FundamentalType::Float,
        FundamentalType::Bool,
        FundamentalType::Long,
        FundamentalType::Double,
        FundamentalType::Char,
        FundamentalType::VariableLength,
        FundamentalType::UnsignedInteger,
    ];

    #[inline]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Width in bytes of the payload following the tag, or `None` when the
    /// payload is length-prefixed.
    pub fn payload_width(self) -> Option<usize> {
        match self {
            FundamentalType::None => Some(0),
            FundamentalType::Integer
            | FundamentalType::Float
            | FundamentalType::UnsignedInteger => Some(4),
            FundamentalType::Long | FundamentalType::Double => Some(8),
            FundamentalType::Bool | FundamentalType::Char => Some(1),
            FundamentalType::Text | FundamentalType::VariableLength => None,
        }
    }

    pub fn is_length_prefixed(self) -> bool {
        self.payload_width().is_none()
    }

    pub fn name(self) -> &'static str {
        match self {
            FundamentalType::None => "none",
            FundamentalType::Text => "text",
            FundamentalType::Integer => "integer",
            FundamentalType::Float => "float",
            FundamentalType::Bool => "bool",
            FundamentalType::Long => "long",
            FundamentalType::Double => "double",
            FundamentalType::Char => "char",
            FundamentalType::VariableLength => "variable-length",
            FundamentalType::UnsignedInteger => "unsigned-integer",
        }
    }
}

impl TryFrom<u8> for FundamentalType {
    type Error = JobError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        FundamentalType::ALL
            .into_iter()
            .find(|t| t.as_byte() == byte)
            .ok_or(JobError::UnknownTypeTag(byte))
    }
}

impl From<FundamentalType> for u8 {
    fn from(t: FundamentalType) -> Self {
        t.as_byte()
    }
}

impl fmt::Display for FundamentalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_exactly_one_byte_wide() {
        assert_eq!(std::mem::size_of::<FundamentalType>(), 1);
        assert_eq!(
            std::mem::size_of::<FundamentalType>(),
            std::mem::size_of::<u8>()
        );
    }

    #[test]
    fn every_tag_value_fits_in_a_byte() {
        for t in FundamentalType::ALL {
            assert!((t.as_byte() as u16) < 256);
            assert_eq!(u8::from(t), t as u8);
        }
    }

    #[test]
    fn tag_values_are_distinct() {
        let mut bytes: Vec<u8> = FundamentalType::ALL.iter().map(|t| t.as_byte()).collect();
        bytes.sort_unstable();
        bytes.dedup();
        assert_eq!(bytes.len(), FundamentalType::ALL.len());
    }

    #[test]
    fn try_from_byte_round_trips_all_tags() {
        for t in FundamentalType::ALL {
            assert_eq!(FundamentalType::try_from(t.as_byte()).unwrap(), t);
        }
    }

    #[test]
    fn try_from_rejects_unassigned_bytes() {
        assert!(matches!(
            FundamentalType::try_from(10),
            Err(JobError::UnknownTypeTag(10))
        ));
        assert!(matches!(
            FundamentalType::try_from(255),
            Err(JobError::UnknownTypeTag(255))
        ));
    }

    #[test]
    fn payload_widths_match_wire_layout() {
        assert_eq!(FundamentalType::None.payload_width(), Some(0));
        assert_eq!(FundamentalType::Integer.payload_width(), Some(4));
        assert_eq!(FundamentalType::Float.payload_width(), Some(4));
        assert_eq!(FundamentalType::UnsignedInteger.payload_width(), Some(4));
        assert_eq!(FundamentalType::Long.payload_width(), Some(8));
        assert_eq!(FundamentalType::Double.payload_width(), Some(8));
        assert_eq!(FundamentalType::Bool.payload_width(), Some(1));
        assert_eq!(FundamentalType::Char.payload_width(), Some(1));
        assert!(FundamentalType::Text.is_length_prefixed());
        assert!(FundamentalType::VariableLength.is_length_prefixed());
    }

    #[test]
    fn display_uses_lowercase_names() {
        assert_eq!(FundamentalType::Text.to_string(), "text");
        assert_eq!(FundamentalType::UnsignedInteger.to_string(), "unsigned-integer");
    }
}
