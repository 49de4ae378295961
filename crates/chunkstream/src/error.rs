//! Error types for stream reading and writing.

use thiserror::Error;

/// Result alias used by [`Cursor`](crate::Cursor) and [`ChunkList`](crate::ChunkList) operations.
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Failure raised while navigating or decoding a chunked stream.
///
/// [`StreamError::Underflow`] is the only recoverable kind: the request touched
/// bytes that have not been appended yet (or lie before logical position zero).
/// Callers append more chunks and retry the identical operation, or treat it as
/// end of stream. Every other variant means the input is corrupt or the call
/// was malformed, and retrying will not help.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("insufficient buffered data")]
    Underflow,
    #[error("invalid utf16 sequence")]
    InvalidUtf16,
    #[error("invalid utf8 sequence")]
    InvalidUtf8,
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),
}

impl StreamError {
    /// Returns `true` for [`StreamError::Underflow`].
    pub fn is_underflow(&self) -> bool {
        matches!(self, StreamError::Underflow)
    }
}

/// Failure raised by [`StreamWriter`](crate::StreamWriter).
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("sink error: {0}")]
    Io(#[from] std::io::Error),
    #[error("character {ch:?} cannot be encoded as {encoding}")]
    Unencodable { ch: char, encoding: &'static str },
    #[error("unknown encoding: {0}")]
    UnknownEncoding(String),
}
