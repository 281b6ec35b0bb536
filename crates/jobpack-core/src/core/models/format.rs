//! Type-code strings: the compact positional description of a job's arguments.
//!
//! A type-code string has one character per argument slot. It is the single
//! place that maps characters to tags; both [`Job::set_arguments`] and
//! [`JobPackage::add_job`] go through [`bind`].
//!
//! | code | tag               |
//! |------|-------------------|
//! | `t`  | `Text`            |
//! | `i`  | `Integer`         |
//! | `f`  | `Float`           |
//! | `b`  | `Bool`            |
//! | `l`  | `Long`            |
//! | `d`  | `Double`          |
//! | `c`  | `Char`            |
//! | `u`  | `UnsignedInteger` |
//! | `v`  | `VariableLength`  |
//!
//! [`Job::set_arguments`]: super::job::Job::set_arguments
//! [`JobPackage::add_job`]: super::package::JobPackage::add_job

use super::argument::Argument;
use super::fundamental_type::FundamentalType;
use crate::engine::error::{JobError, Result};
use phf::{Map, phf_map};
use tracing::error;

static TYPE_CODES: Map<char, FundamentalType> = phf_map! {
    't' => FundamentalType::Text,
    'i' => FundamentalType::Integer,
    'f' => FundamentalType::Float,
    'b' => FundamentalType::Bool,
    'l' => FundamentalType::Long,
    'd' => FundamentalType::Double,
    'c' => FundamentalType::Char,
    'u' => FundamentalType::UnsignedInteger,
    'v' => FundamentalType::VariableLength,
};

pub fn tag_for_code(code: char) -> Result<FundamentalType> {
    TYPE_CODES.get(&code).copied().ok_or_else(|| {
        error!("Unknown type code '{}'", code);
        JobError::UnknownTypeCode(code)
    })
}

/// Returns the code character for a tag, or `None` for `FundamentalType::None`.
pub fn code_for_tag(tag: FundamentalType) -> Option<char> {
    TYPE_CODES
        .entries()
        .find(|(_, t)| **t == tag)
        .map(|(c, _)| *c)
}

pub fn parse_type_codes(type_codes: &str) -> Result<Vec<FundamentalType>> {
    type_codes.chars().map(tag_for_code).collect()
}

/// An ordered list of argument values, built up positionally.
///
/// The [`arguments!`](crate::arguments) macro is the usual way to build one.
/// Note that an unsuffixed float literal is an `f64` and therefore a `Double`;
/// use an `f32` suffix for the `f` code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentList {
    values: Vec<Argument>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: impl Into<Argument>) {
        self.values.push(value.into());
    }

    pub fn with(mut self, value: impl Into<Argument>) -> Self {
        self.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[Argument] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<Argument> {
        self.values
    }
}

impl From<Vec<Argument>> for ArgumentList {
    fn from(values: Vec<Argument>) -> Self {
        Self { values }
    }
}

impl FromIterator<Argument> for ArgumentList {
    fn from_iter<I: IntoIterator<Item = Argument>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ArgumentList {
    type Item = Argument;
    type IntoIter = std::vec::IntoIter<Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// Builds an [`ArgumentList`] from positional values.
///
/// ```
/// use jobpack::arguments;
///
/// let args = arguments!["particles.mrc", 42i32, 3.14f32];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! arguments {
    () => {
        $crate::core::models::format::ArgumentList::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut list = $crate::core::models::format::ArgumentList::new();
        $(list.push($value);)+
        list
    }};
}

/// Pairs every code in `type_codes` with the value at the same position.
///
/// # Errors
///
/// - [`JobError::UnknownTypeCode`] for a character outside the table.
/// - [`JobError::FormatArity`] if the number of codes and values differ.
/// - [`JobError::TypeMismatch`] if a value's tag differs from its code's tag.
pub fn bind(type_codes: &str, values: ArgumentList) -> Result<Vec<Argument>> {
    let tags = parse_type_codes(type_codes)?;
    if tags.len() != values.len() {
        error!(
            "Type codes '{}' describe {} arguments but {} values were supplied",
            type_codes,
            tags.len(),
            values.len()
        );
        return Err(JobError::FormatArity {
            expected: tags.len(),
            found: values.len(),
        });
    }

    let bound = values.into_vec();
    for (position, (tag, value)) in tags.iter().zip(&bound).enumerate() {
        if let Err(e) = value.expect_type(*tag) {
            error!(
                "Argument {} does not match type code '{}': {}",
                position,
                type_codes.chars().nth(position).unwrap_or('?'),
                e
            );
            return Err(e);
        }
    }
    Ok(bound)
}

/// Renders the type-code string describing `arguments`; unset slots show as `-`.
pub fn signature_of(arguments: &[Argument]) -> String {
    arguments
        .iter()
        .map(|a| code_for_tag(a.fundamental_type()).unwrap_or('-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments;

    #[test]
    fn every_code_maps_to_a_distinct_tag() {
        let tags = parse_type_codes("tifbldcuv").unwrap();
        assert_eq!(
            tags,
            vec![
                FundamentalType::Text,
                FundamentalType::Integer,
                FundamentalType::Float,
                FundamentalType::Bool,
                FundamentalType::Long,
                FundamentalType::Double,
                FundamentalType::Char,
                FundamentalType::UnsignedInteger,
                FundamentalType::VariableLength,
            ]
        );
    }

    #[test]
    fn code_for_tag_inverts_the_table() {
        for code in "tifbldcuv".chars() {
            let tag = tag_for_code(code).unwrap();
            assert_eq!(code_for_tag(tag), Some(code));
        }
        assert_eq!(code_for_tag(FundamentalType::None), None);
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(matches!(
            parse_type_codes("tiz"),
            Err(JobError::UnknownTypeCode('z'))
        ));
    }

    #[test]
    fn macro_builds_positional_list() {
        let list = arguments!["a", 1i32, 2.0f32, true];
        assert_eq!(list.len(), 4);
        assert_eq!(list.as_slice()[0], Argument::from("a"));
        assert_eq!(list.as_slice()[3], Argument::Bool(true));
        assert!(arguments![].is_empty());
    }

    #[test]
    fn builder_with_chains_values() {
        let list = ArgumentList::new().with("x").with(7u32);
        assert_eq!(
            list.into_vec(),
            vec![Argument::from("x"), Argument::UnsignedInteger(7)]
        );
    }

    #[test]
    fn bind_accepts_matching_values() {
        let bound = bind("tif", arguments!["test", 42i32, 3.14f32]).unwrap();
        assert_eq!(bound.len(), 3);
        assert_eq!(bound[1].integer().unwrap(), 42);
    }

    #[test]
    fn bind_rejects_count_mismatch() {
        let result = bind("ti", arguments!["only one"]);
        assert!(matches!(
            result,
            Err(JobError::FormatArity {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn bind_rejects_type_mismatch() {
        let result = bind("f", arguments![3.14f64]);
        assert!(matches!(
            result,
            Err(JobError::TypeMismatch {
                expected: FundamentalType::Float,
                found: FundamentalType::Double
            })
        ));
    }

    #[test]
    fn signature_marks_unset_slots() {
        let args = vec![Argument::from("a"), Argument::None, Argument::from(1i64)];
        assert_eq!(signature_of(&args), "t-l");
    }
}
