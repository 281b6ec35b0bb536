//! Turns manifest and CSV values into typed job arguments, one type code per value.

use jobpack::core::models::argument::Argument;
use jobpack::core::models::format::{ArgumentList, tag_for_code};
use jobpack::core::models::fundamental_type::FundamentalType;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown type code '{0}'. Expected one of 't', 'i', 'f', 'b', 'l', 'd', 'c', 'u', 'v'.")]
    UnknownTypeCode(char),

    #[error("Invalid value '{value}' for type code '{code}': expected {expected}.")]
    InvalidValue {
        code: char,
        value: String,
        expected: &'static str,
    },

    #[error("Type codes '{codes}' describe {expected} values, but {found} were given.")]
    ValueCount {
        codes: String,
        expected: usize,
        found: usize,
    },
}

fn tag(code: char) -> Result<FundamentalType, ParseError> {
    tag_for_code(code).map_err(|_| ParseError::UnknownTypeCode(code))
}

fn invalid(code: char, value: impl ToString, expected: &'static str) -> ParseError {
    ParseError::InvalidValue {
        code,
        value: value.to_string(),
        expected,
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Parses one text field (a CSV cell) as the type named by `code`.
///
/// `v` fields are taken as their raw UTF-8 bytes; `c` fields must be exactly
/// one byte long.
pub fn parse_field(code: char, text: &str) -> Result<Argument, ParseError> {
    let trimmed = text.trim();
    let argument = match tag(code)? {
        FundamentalType::Text => Argument::from(text),
        FundamentalType::Integer => trimmed
            .parse::<i32>()
            .map(Argument::from)
            .map_err(|_| invalid(code, text, "a 32-bit integer"))?,
        FundamentalType::Float => trimmed
            .parse::<f32>()
            .map(Argument::from)
            .map_err(|_| invalid(code, text, "a number"))?,
        FundamentalType::Bool => parse_bool(trimmed)
            .map(Argument::from)
            .ok_or_else(|| invalid(code, text, "true/false, yes/no or 1/0"))?,
        FundamentalType::Long => trimmed
            .parse::<i64>()
            .map(Argument::from)
            .map_err(|_| invalid(code, text, "a 64-bit integer"))?,
        FundamentalType::Double => trimmed
            .parse::<f64>()
            .map(Argument::from)
            .map_err(|_| invalid(code, text, "a number"))?,
        FundamentalType::Char => match text.as_bytes() {
            [byte] => Argument::from(*byte),
            _ => return Err(invalid(code, text, "a single byte character")),
        },
        FundamentalType::UnsignedInteger => trimmed
            .parse::<u32>()
            .map(Argument::from)
            .map_err(|_| invalid(code, text, "an unsigned 32-bit integer"))?,
        FundamentalType::VariableLength => Argument::from(text.as_bytes()),
        FundamentalType::None => return Err(ParseError::UnknownTypeCode(code)),
    };
    Ok(argument)
}

/// Converts one TOML value from a manifest `[[jobs]]` entry.
///
/// Integers are accepted where a float is expected. A `c` value may be a
/// one-character string or an integer in `0..=255`; a `v` value may be a
/// string or an array of byte integers.
pub fn parse_toml_value(code: char, value: &toml::Value) -> Result<Argument, ParseError> {
    use toml::Value;

    let argument = match (tag(code)?, value) {
        (FundamentalType::Text, Value::String(s)) => Argument::from(s.as_str()),
        (FundamentalType::Integer, Value::Integer(i)) => i32::try_from(*i)
            .map(Argument::from)
            .map_err(|_| invalid(code, i, "a 32-bit integer"))?,
        (FundamentalType::Float, Value::Float(f)) => Argument::from(*f as f32),
        (FundamentalType::Float, Value::Integer(i)) => Argument::from(*i as f32),
        (FundamentalType::Bool, Value::Boolean(b)) => Argument::from(*b),
        (FundamentalType::Long, Value::Integer(i)) => Argument::from(*i),
        (FundamentalType::Double, Value::Float(f)) => Argument::from(*f),
        (FundamentalType::Double, Value::Integer(i)) => Argument::from(*i as f64),
        (FundamentalType::Char, Value::String(s)) if s.len() == 1 => {
            Argument::from(s.as_bytes()[0])
        }
        (FundamentalType::Char, Value::Integer(i)) => u8::try_from(*i)
            .map(Argument::from)
            .map_err(|_| invalid(code, i, "a byte in 0..=255"))?,
        (FundamentalType::UnsignedInteger, Value::Integer(i)) => u32::try_from(*i)
            .map(Argument::from)
            .map_err(|_| invalid(code, i, "an unsigned 32-bit integer"))?,
        (FundamentalType::VariableLength, Value::String(s)) => Argument::from(s.as_bytes()),
        (FundamentalType::VariableLength, Value::Array(items)) => {
            let bytes = items
                .iter()
                .map(|item| {
                    item.as_integer()
                        .and_then(|i| u8::try_from(i).ok())
                        .ok_or_else(|| invalid(code, item, "an array of bytes in 0..=255"))
                })
                .collect::<Result<Vec<u8>, _>>()?;
            Argument::from(bytes)
        }
        (FundamentalType::None, _) => return Err(ParseError::UnknownTypeCode(code)),
        (t, v) => return Err(invalid(code, v, expected_toml(t))),
    };
    Ok(argument)
}

fn expected_toml(tag: FundamentalType) -> &'static str {
    match tag {
        FundamentalType::Text => "a string",
        FundamentalType::Integer | FundamentalType::Long | FundamentalType::UnsignedInteger => {
            "an integer"
        }
        FundamentalType::Float | FundamentalType::Double => "a number",
        FundamentalType::Bool => "a boolean",
        FundamentalType::Char => "a one-character string or a byte",
        FundamentalType::VariableLength => "a string or an array of bytes",
        FundamentalType::None => "nothing",
    }
}

fn check_count(codes: &str, found: usize) -> Result<(), ParseError> {
    let expected = codes.chars().count();
    if expected != found {
        return Err(ParseError::ValueCount {
            codes: codes.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

/// Parses a row of text fields against a type-code string.
pub fn parse_row<'a>(
    codes: &str,
    fields: impl ExactSizeIterator<Item = &'a str>,
) -> Result<ArgumentList, ParseError> {
    check_count(codes, fields.len())?;
    codes
        .chars()
        .zip(fields)
        .map(|(code, field)| parse_field(code, field))
        .collect()
}

/// Parses a manifest job's values against a type-code string.
pub fn parse_toml_row(codes: &str, values: &[toml::Value]) -> Result<ArgumentList, ParseError> {
    check_count(codes, values.len())?;
    codes
        .chars()
        .zip(values)
        .map(|(code, value)| parse_toml_value(code, value))
        .collect()
}
