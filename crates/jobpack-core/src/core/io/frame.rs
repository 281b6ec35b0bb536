//! Self-delimiting frames around package and result bodies.
//!
//! A package body does not carry its own slot counts, and a stream reader
//! needs to know how many bytes belong to the next structure before it touches
//! them. A frame header supplies both:
//!
//! ```text
//! package frame := "JPKG" | version:u8 | capacity:i32 | added:i32 | body_len:u64 | body
//! result frame  := "JRES" | version:u8 | body_len:u64 | body
//! ```
//!
//! `body_len` is always the body's `encoded_size()`. A reader never reads past
//! it, and skips whatever the decoded structure left unread, so the next frame
//! on the stream starts where the header said it would.

use super::codec;
use super::traits::{WireDecode, WireEncode};
use crate::core::models::package::JobPackage;
use crate::core::models::result::JobResult;
use crate::engine::error::{JobError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Take, Write};
use std::path::Path;
use tracing::{debug, error};

pub const PACKAGE_MAGIC: [u8; 4] = *b"JPKG";
pub const RESULT_MAGIC: [u8; 4] = *b"JRES";
pub const FRAME_VERSION: u8 = 1;

/// Header bytes preceding a package body.
pub const PACKAGE_HEADER_LEN: usize = 4 + 1 + 4 + 4 + 8;
/// Header bytes preceding a result body.
pub const RESULT_HEADER_LEN: usize = 4 + 1 + 8;

/// Header fields of a package frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageHeader {
    pub capacity: usize,
    pub added: usize,
    pub body_len: u64,
}

fn write_preamble(writer: &mut impl Write, magic: [u8; 4]) -> Result<()> {
    writer.write_all(&magic)?;
    codec::write_u8(writer, FRAME_VERSION)
}

fn read_preamble(reader: &mut impl Read, magic: [u8; 4]) -> Result<()> {
    let mut found = [0u8; 4];
    reader.read_exact(&mut found)?;
    if found != magic {
        error!("Expected frame magic {:?}, found {:?}", magic, found);
        return Err(JobError::BadMagic);
    }
    let version = codec::read_u8(reader)?;
    if version != FRAME_VERSION {
        error!("Unsupported frame version {}", version);
        return Err(JobError::UnsupportedVersion(version));
    }
    Ok(())
}

/// Decodes a body from exactly `body_len` bytes of `reader`.
fn read_body<R: Read, T>(
    reader: &mut R,
    body_len: u64,
    decode: impl FnOnce(&mut Take<&mut R>) -> Result<T>,
) -> Result<T> {
    let mut body = Read::take(&mut *reader, body_len);
    let value = decode(&mut body)?;
    let unread = body.limit();
    if unread != 0 {
        error!(
            "Frame body declared {} bytes but the structure used {}",
            body_len,
            body_len - unread
        );
        // Skip the remainder so the stream stays aligned on the next frame.
        std::io::copy(&mut body, &mut std::io::sink())?;
        return Err(JobError::FrameLengthMismatch {
            declared: body_len,
            actual: body_len - unread,
        });
    }
    Ok(value)
}

/// Encodes a complete package frame, header and body, into memory.
///
/// # Errors
///
/// Returns [`JobError::AllocationFailure`] if a count or field exceeds the
/// wire limits.
pub fn package_frame(package: &JobPackage) -> Result<Vec<u8>> {
    let body_len = package.encoded_size();
    let mut frame = Vec::with_capacity(PACKAGE_HEADER_LEN + body_len);
    write_preamble(&mut frame, PACKAGE_MAGIC)?;
    codec::write_len(&mut frame, package.capacity())?;
    codec::write_len(&mut frame, package.added())?;
    codec::write_u64(&mut frame, body_len as u64)?;
    package.write_body(&mut frame)?;
    debug_assert_eq!(frame.len(), PACKAGE_HEADER_LEN + body_len);
    Ok(frame)
}

/// Writes a package frame and returns the total number of bytes written.
///
/// Nothing reaches `writer` unless the whole frame encoded.
pub fn write_package(writer: &mut impl Write, package: &JobPackage) -> Result<u64> {
    let frame = package_frame(package)?;
    writer.write_all(&frame)?;
    debug!(
        "Wrote package frame for '{}' ({} body bytes)",
        package.executable_name(),
        frame.len() - PACKAGE_HEADER_LEN
    );
    Ok(frame.len() as u64)
}

pub fn read_package_header(reader: &mut impl Read) -> Result<PackageHeader> {
    read_preamble(reader, PACKAGE_MAGIC)?;
    let capacity = codec::read_len(reader)?;
    let added = codec::read_len(reader)?;
    let body_len = codec::read_u64(reader)?;
    Ok(PackageHeader {
        capacity,
        added,
        body_len,
    })
}

/// Reads one package frame.
///
/// # Errors
///
/// Returns [`JobError::BadMagic`] or [`JobError::UnsupportedVersion`] for a
/// foreign header, [`JobError::FrameLengthMismatch`] if the decoded body
/// leaves declared bytes unused, and any decoding error of the body itself.
pub fn read_package(reader: &mut impl Read) -> Result<JobPackage> {
    let header = read_package_header(reader)?;
    read_body(reader, header.body_len, |body| {
        JobPackage::decode_with(body, header.capacity, header.added)
    })
}

/// Encodes a complete result frame into memory.
pub fn result_frame(result: &JobResult) -> Result<Vec<u8>> {
    let body_len = result.encoded_size();
    let mut frame = Vec::with_capacity(RESULT_HEADER_LEN + body_len);
    write_preamble(&mut frame, RESULT_MAGIC)?;
    codec::write_u64(&mut frame, body_len as u64)?;
    result.write_body(&mut frame)?;
    debug_assert_eq!(frame.len(), RESULT_HEADER_LEN + body_len);
    Ok(frame)
}

/// Writes a result frame and returns the total number of bytes written.
///
/// Nothing reaches `writer` unless the whole frame encoded.
pub fn write_result(writer: &mut impl Write, result: &JobResult) -> Result<u64> {
    let frame = result_frame(result)?;
    writer.write_all(&frame)?;
    Ok(frame.len() as u64)
}

pub fn read_result(reader: &mut impl Read) -> Result<JobResult> {
    read_preamble(reader, RESULT_MAGIC)?;
    let body_len = codec::read_u64(reader)?;
    read_body(reader, body_len, |body| JobResult::decode(body))
}

/// Writes a package frame to `path`.
///
/// The frame is encoded before the file is created, so an encoding failure
/// leaves no file behind.
pub fn write_package_to_path<P: AsRef<Path>>(path: P, package: &JobPackage) -> Result<u64> {
    let frame = package_frame(package)?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(frame.len() as u64)
}

pub fn read_package_from_path<P: AsRef<Path>>(path: P) -> Result<JobPackage> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    read_package(&mut reader)
}
