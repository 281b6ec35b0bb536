use crate::core::models::fundamental_type::FundamentalType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobError>;

/// Failures of the job packaging protocol.
///
/// These are protocol or programmer errors rather than ordinary runtime
/// conditions: a structure that fails to encode or decode leaves the byte
/// stream it was read from in an unknown position, so callers are expected to
/// abandon the stream instead of retrying on it.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Argument type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: FundamentalType,
        found: FundamentalType,
    },

    #[error("Type-code arity mismatch: expected {expected} entries, found {found}")]
    FormatArity { expected: usize, found: usize },

    #[error("Job package is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("Refusing allocation: {0}")]
    AllocationFailure(String),

    #[error("Unknown type code '{0}'")]
    UnknownTypeCode(char),

    #[error("Unknown fundamental type tag {0:#04x} on the wire")]
    UnknownTypeTag(u8),

    #[error("No job with number {0} in this package")]
    UnknownJob(i32),

    #[error("Text field is not valid UTF-8")]
    InvalidText,

    #[error("Invalid boolean byte {0:#04x} on the wire")]
    InvalidBool(u8),

    #[error("Frame does not start with the expected magic bytes")]
    BadMagic,

    #[error("Unsupported frame version {0}")]
    UnsupportedVersion(u8),

    #[error("Frame declares {declared} body bytes but the body occupies {actual}")]
    FrameLengthMismatch { declared: u64, actual: u64 },

    #[error("Completion channel closed with {pending} job(s) still pending")]
    ChannelClosed { pending: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
