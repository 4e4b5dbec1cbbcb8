use thiserror::Error;

/// Errors produced while encoding or decoding objects.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The zlib stream could not be written.
    #[error("zlib compression failed: {0}")]
    Compress(#[source] std::io::Error),

    /// The zlib stream is corrupt or could not be read.
    #[error("zlib decompression failed: {0}")]
    Decompress(#[source] std::io::Error),

    /// The inflated buffer has no NUL byte separating header from data.
    #[error("invalid object: no null byte")]
    MissingNul,

    #[error("invalid object header: {0:?}")]
    InvalidHeader(String),

    #[error("unknown object type: {0:?}")]
    UnknownType(String),

    /// The length field of the header is not a decimal number.
    #[error("invalid size in header: {0:?}")]
    InvalidLength(String),

    /// The header length disagrees with the payload (usually truncation).
    #[error("invalid data size: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid object id: {0}")]
    InvalidObjectId(String),
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
