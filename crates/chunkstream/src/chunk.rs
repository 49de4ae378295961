//! Immutable, shareable byte chunks.

use std::fmt;
use std::ops::{Deref, RangeBounds};

use bytes::Bytes;

/// One immutable unit of buffered bytes.
///
/// A chunk is a reference-counted view over its payload: cloning it, slicing
/// it, or handing it to another [`ChunkList`](crate::ChunkList) never copies
/// the underlying bytes.
///
/// # Example
///
/// ```
/// use chunkstream::Chunk;
///
/// let chunk = Chunk::from(vec![1, 2, 3, 4]);
/// let tail = chunk.slice(2..);
/// assert_eq!(&tail[..], &[3, 4]);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Chunk(Bytes);

impl Chunk {
    /// Creates an empty chunk.
    pub fn new() -> Self {
        Self(Bytes::new())
    }

    /// Creates a chunk that borrows a static byte slice.
    pub const fn from_static(bytes: &'static [u8]) -> Self {
        Self(Bytes::from_static(bytes))
    }

    /// Copies `data` into a new chunk.
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(data))
    }

    /// Number of bytes in the chunk.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a zero-copy view of `range` within this chunk.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds, like slice indexing.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Self {
        Self(self.0.slice(range))
    }

    /// Returns `true` when both chunks view the same bytes of the same payload.
    pub fn ptr_eq(&self, other: &Chunk) -> bool {
        self.0.as_ptr() == other.0.as_ptr() && self.0.len() == other.0.len()
    }

    /// Returns the underlying [`Bytes`] handle.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl Deref for Chunk {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Chunk").field(&&self.0[..]).finish()
    }
}

impl From<Bytes> for Chunk {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(data: Vec<u8>) -> Self {
        Self(Bytes::from(data))
    }
}

impl From<&'static [u8]> for Chunk {
    fn from(data: &'static [u8]) -> Self {
        Self(Bytes::from_static(data))
    }
}

impl<const N: usize> From<[u8; N]> for Chunk {
    fn from(data: [u8; N]) -> Self {
        Self(Bytes::copy_from_slice(&data))
    }
}

impl From<Chunk> for Bytes {
    fn from(chunk: Chunk) -> Self {
        chunk.0
    }
}

impl PartialEq<[u8]> for Chunk {
    fn eq(&self, other: &[u8]) -> bool {
        self.0[..] == *other
    }
}

impl PartialEq<&[u8]> for Chunk {
    fn eq(&self, other: &&[u8]) -> bool {
        self.0[..] == **other
    }
}

impl<const N: usize> PartialEq<[u8; N]> for Chunk {
    fn eq(&self, other: &[u8; N]) -> bool {
        self.0[..] == other[..]
    }
}
