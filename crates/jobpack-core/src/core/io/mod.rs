//! Binary encoding of job data.
//!
//! All multi-byte values are little-endian. Lengths and counts are written as
//! 32-bit signed integers and validated on read.

pub mod codec;
pub mod frame;
pub mod traits;
