use thiserror::Error;

/// Failure while reading from a byte buffer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A read would cross the end of the buffer.
    #[error("unexpected end of buffer")]
    EndOfBuffer,
    /// A byte range that should hold UTF-8 text does not.
    #[error("invalid utf-8 payload")]
    InvalidUtf8,
}
