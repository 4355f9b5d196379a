//! Failure taxonomy for the codec engine.
//!
//! All failures are value-level and synchronous: they are returned to the
//! immediate caller, never retried internally, and never logged. A failed
//! call leaves no partial effect; the per-call dedup table dies with the
//! call.

use thiserror::Error;

use tether_buffers::BufferError;

/// Failure while encoding a value tree.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The value holds a kind that cannot cross the boundary by value.
    #[error("unsupported value kind: {0}")]
    UnsupportedValueKind(&'static str),
    /// A string's UTF-8 payload exceeds the length-field capacity.
    #[error("string of {len} bytes exceeds the length-field capacity")]
    StringTooLong { len: usize },
}

/// Failure while decoding a byte stream.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream ended in the middle of a record.
    #[error("truncated input")]
    TruncatedInput,
    /// An opcode or tag byte outside the assigned space.
    #[error("invalid opcode 0x{0:02x}")]
    InvalidOpcode(u8),
    /// A back-reference names a table ID that was never assigned.
    #[error("unknown string back-reference {0}")]
    UnknownBackReference(u32),
    /// A declared length or count cannot fit in the remaining buffer.
    #[error("declared length exceeds remaining input")]
    LengthOverflow,
    /// A string-literal payload is not valid UTF-8.
    #[error("string payload is not valid utf-8")]
    InvalidUtf8,
}

impl From<BufferError> for DecodeError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::EndOfBuffer => DecodeError::TruncatedInput,
            BufferError::InvalidUtf8 => DecodeError::InvalidUtf8,
        }
    }
}
