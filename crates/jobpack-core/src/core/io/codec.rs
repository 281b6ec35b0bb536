//! Little-endian primitive readers and writers shared by every wire structure.
//!
//! Lengths and counts travel as signed 32-bit integers. Readers validate them
//! before allocating, so a corrupted length surfaces as
//! [`JobError::AllocationFailure`] instead of an attempt to reserve gigabytes.

use crate::engine::error::{JobError, Result};
use std::io::{Read, Write};
use tracing::error;

/// Upper bound on any single length-prefixed field or element count.
pub const MAX_FIELD_LEN: usize = 64 * 1024 * 1024;

/// Encoded width of a length or count prefix.
pub const LEN_PREFIX: usize = 4;

pub fn write_u8(writer: &mut impl Write, value: u8) -> Result<()> {
    writer.write_all(&[value])?;
    Ok(())
}

pub fn write_bool(writer: &mut impl Write, value: bool) -> Result<()> {
    write_u8(writer, u8::from(value))
}

pub fn write_i32(writer: &mut impl Write, value: i32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_u32(writer: &mut impl Write, value: u32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_i64(writer: &mut impl Write, value: i64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_u64(writer: &mut impl Write, value: u64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_f32(writer: &mut impl Write, value: f32) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn write_f64(writer: &mut impl Write, value: f64) -> Result<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Writes a count or length prefix, rejecting values the reader would refuse.
pub fn write_len(writer: &mut impl Write, len: usize) -> Result<()> {
    if len > MAX_FIELD_LEN {
        error!("Refusing to encode length {} (limit {})", len, MAX_FIELD_LEN);
        return Err(JobError::AllocationFailure(format!(
            "length {} exceeds the {} byte field limit",
            len, MAX_FIELD_LEN
        )));
    }
    write_i32(writer, len as i32)
}

pub fn write_bytes(writer: &mut impl Write, bytes: &[u8]) -> Result<()> {
    write_len(writer, bytes.len())?;
    writer.write_all(bytes)?;
    Ok(())
}

pub fn write_text(writer: &mut impl Write, text: &str) -> Result<()> {
    write_bytes(writer, text.as_bytes())
}

pub fn read_u8(reader: &mut impl Read) -> Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_bool(reader: &mut impl Read) -> Result<bool> {
    match read_u8(reader)? {
        0 => Ok(false),
        1 => Ok(true),
        other => {
            error!("Decoded boolean byte {:#04x} is neither 0 nor 1", other);
            Err(JobError::InvalidBool(other))
        }
    }
}

pub fn read_i32(reader: &mut impl Read) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub fn read_u32(reader: &mut impl Read) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub fn read_i64(reader: &mut impl Read) -> Result<i64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

pub fn read_u64(reader: &mut impl Read) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

pub fn read_f32(reader: &mut impl Read) -> Result<f32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

pub fn read_f64(reader: &mut impl Read) -> Result<f64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Reads a count or length prefix and checks it against [`MAX_FIELD_LEN`].
pub fn read_len(reader: &mut impl Read) -> Result<usize> {
    let raw = read_i32(reader)?;
    checked_len(raw)
}

pub fn checked_len(raw: i32) -> Result<usize> {
    if raw < 0 {
        error!("Decoded negative length {}", raw);
        return Err(JobError::AllocationFailure(format!(
            "negative length {} on the wire",
            raw
        )));
    }
    let len = raw as usize;
    if len > MAX_FIELD_LEN {
        error!("Decoded length {} exceeds limit {}", len, MAX_FIELD_LEN);
        return Err(JobError::AllocationFailure(format!(
            "length {} exceeds the {} byte field limit",
            len, MAX_FIELD_LEN
        )));
    }
    Ok(len)
}

pub fn read_bytes(reader: &mut impl Read) -> Result<Vec<u8>> {
    let len = read_len(reader)?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn read_text(reader: &mut impl Read) -> Result<String> {
    let bytes = read_bytes(reader)?;
    String::from_utf8(bytes).map_err(|_| {
        error!("Decoded text field is not valid UTF-8");
        JobError::InvalidText
    })
}

/// Encoded width of a length-prefixed field holding `len` bytes.
#[inline]
pub fn prefixed_len(len: usize) -> usize {
    LEN_PREFIX + len
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn integers_are_little_endian() {
        let mut buf = Vec::new();
        write_i32(&mut buf, 0x01020304).unwrap();
        assert_eq!(buf, vec![0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn text_is_length_prefixed() {
        let mut buf = Vec::new();
        write_text(&mut buf, "abc").unwrap();
        assert_eq!(buf, vec![3, 0, 0, 0, b'a', b'b', b'c']);
        assert_eq!(read_text(&mut Cursor::new(buf)).unwrap(), "abc");
    }

    #[test]
    fn read_len_rejects_negative_values() {
        let mut buf = Vec::new();
        write_i32(&mut buf, -1).unwrap();
        let result = read_len(&mut Cursor::new(buf));
        assert!(matches!(result, Err(JobError::AllocationFailure(_))));
    }

    #[test]
    fn read_len_rejects_oversized_values() {
        let mut buf = Vec::new();
        write_i32(&mut buf, i32::MAX).unwrap();
        let result = read_len(&mut Cursor::new(buf));
        assert!(matches!(result, Err(JobError::AllocationFailure(_))));
    }

    #[test]
    fn read_text_rejects_invalid_utf8() {
        let buf = vec![2, 0, 0, 0, 0xff, 0xfe];
        assert!(matches!(
            read_text(&mut Cursor::new(buf)),
            Err(JobError::InvalidText)
        ));
    }

    #[test]
    fn read_bool_rejects_bytes_other_than_zero_and_one() {
        assert!(read_bool(&mut Cursor::new(vec![1])).unwrap());
        assert!(!read_bool(&mut Cursor::new(vec![0])).unwrap());
        assert!(matches!(
            read_bool(&mut Cursor::new(vec![7])),
            Err(JobError::InvalidBool(7))
        ));
    }

    #[test]
    fn truncated_input_is_an_io_error() {
        let result = read_i64(&mut Cursor::new(vec![1, 2, 3]));
        match result {
            Err(JobError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("expected EOF error, got {:?}", other),
        }
    }
}
