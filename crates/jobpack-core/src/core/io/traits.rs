use crate::engine::error::{JobError, Result};
use std::io::{Cursor, Read, Write};
use tracing::error;

/// Defines the encoding half of the wire contract.
///
/// `encoded_size` is binding: a transport pre-sizes its buffers from it and
/// sends exactly that many bytes before it interprets anything that follows
/// as the next structure. Implementors write their body through
/// [`write_body`](WireEncode::write_body); callers go through
/// [`encode`](WireEncode::encode) or [`to_bytes`](WireEncode::to_bytes), which
/// check the contract.
pub trait WireEncode {
    /// Returns the exact number of bytes [`encode`](WireEncode::encode) writes.
    fn encoded_size(&self) -> usize;

    /// Writes the structure in wire order.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be represented on the wire or the
    /// writer fails.
    fn write_body(&self, writer: &mut impl Write) -> Result<()>;

    /// Writes the structure and returns the number of bytes written.
    ///
    /// Encoding is all-or-nothing: the body is staged in memory and handed to
    /// `writer` in a single `write_all`, so a field that cannot be represented
    /// fails before the first byte goes out.
    ///
    /// # Errors
    ///
    /// Returns an error if a field cannot be represented on the wire or the
    /// writer fails.
    fn encode(&self, writer: &mut impl Write) -> Result<usize> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(bytes.len())
    }

    /// Encodes into a freshly allocated buffer sized from `encoded_size()`.
    ///
    /// In debug builds a byte count differing from `encoded_size()` aborts,
    /// since every later read on the same stream would be misaligned.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_size());
        self.write_body(&mut buf)?;
        debug_assert_eq!(
            buf.len(),
            self.encoded_size(),
            "encoder wrote a different byte count than encoded_size() promised"
        );
        Ok(buf)
    }
}

/// Defines the decoding half of the wire contract.
///
/// Decoding is all-or-nothing: an error leaves no partially built value
/// behind, and the reader is positioned somewhere inside the failed structure.
pub trait WireDecode: Sized {
    /// Reads one structure in wire order.
    ///
    /// # Errors
    ///
    /// Returns an error on truncated input, unknown tags, invalid lengths, or
    /// malformed field contents.
    fn decode(reader: &mut impl Read) -> Result<Self>;

    /// Decodes a structure that must occupy the whole of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::FrameLengthMismatch`] if bytes remain after the
    /// structure, in addition to the errors of [`decode`](WireDecode::decode).
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let value = Self::decode(&mut cursor)?;
        let consumed = cursor.position();
        if consumed != bytes.len() as u64 {
            error!(
                "Decoded structure consumed {} of {} bytes",
                consumed,
                bytes.len()
            );
            return Err(JobError::FrameLengthMismatch {
                declared: bytes.len() as u64,
                actual: consumed,
            });
        }
        Ok(value)
    }
}
