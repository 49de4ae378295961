//! Chunked byte stream decoding.
//!
//! This crate is the bottom layer for parsers of binary file and stream
//! formats. Data arrives as discontiguous [`Chunk`]s that a [`ChunkList`]
//! links into one logical stream without copying; a [`Cursor`] walks that
//! stream forwards and backwards, decoding scalars, extended floats and text.
//!
//! # Overview
//!
//! - [`Chunk`] - An immutable, cheaply cloned byte payload
//! - [`ChunkList`] - Linked chunks with a movable consumption window
//! - [`Cursor`] - Reads and peeks typed values across chunk boundaries
//! - [`StreamWriter`] - Buffers encoded values and flushes them to a sink
//!
//! Reads past the buffered data fail with [`StreamError::Underflow`] and leave
//! the cursor untouched, so a caller can append more chunks and retry.
//!
//! # Example
//!
//! ```
//! use chunkstream::{Cursor, StreamError};
//!
//! let mut cursor = Cursor::default();
//! cursor.append(vec![0x00, 0x05, b'h']);
//!
//! let len = cursor.read_u16(false)? as usize;
//! assert_eq!(cursor.read_string(Some(len), "ascii"), Err(StreamError::Underflow));
//!
//! cursor.append(vec![b'e', b'l', b'l', b'o']);
//! assert_eq!(cursor.read_string(Some(len), "ascii")?, "hello");
//! # Ok::<(), StreamError>(())
//! ```

mod chunk;
mod chunk_list;
mod cursor;
mod encoding;
mod error;
mod float80;
mod strings;
mod writer;

pub use chunk::Chunk;
pub use chunk_list::{ChunkList, Iter};
pub use cursor::Cursor;
pub use encoding::Encoding;
pub use error::{Result, StreamError, WriterError};
pub use float80::{decode_f80, encode_f80};
pub use writer::{StreamWriter, BUFFER_SIZE};
