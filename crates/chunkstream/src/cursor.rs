//! Stateful read position over a [`ChunkList`].

use crate::float80::decode_f80;
use crate::{Chunk, ChunkList, Result, StreamError};

/// A logical read position over a [`ChunkList`].
///
/// The cursor tracks two offsets: `local_offset` within the chunk at the head
/// of the list window, and `offset`, the number of bytes consumed since
/// logical position zero. Reads consume bytes and move both; peeks decode the
/// same values at a distance from the cursor without touching any state.
///
/// Multi-byte values are big-endian unless `little_endian` is set. Any request
/// for bytes outside the available window fails with
/// [`StreamError::Underflow`] and leaves the cursor unchanged, so the same
/// call can be retried after more chunks are appended.
///
/// # Example
///
/// ```
/// use chunkstream::{Chunk, ChunkList, Cursor};
///
/// let mut list = ChunkList::new();
/// list.append(Chunk::from(vec![10, 160]));
/// list.append(Chunk::from(vec![20, 29, 119]));
///
/// let mut cursor = Cursor::new(list);
/// assert_eq!(cursor.peek_u16(1, false)?, 0xa014);
/// assert_eq!(cursor.read_u8()?, 10);
/// assert_eq!(cursor.read_u24(true)?, 0x1d14a0);
/// assert_eq!(cursor.offset(), 4);
/// assert!(cursor.read_u16(false).unwrap_err().is_underflow());
/// # Ok::<(), chunkstream::StreamError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cursor {
    list: ChunkList,
    local_offset: usize,
    offset: usize,
}

macro_rules! scalar_accessors {
    ($($ty:ident => $read:ident, $peek:ident;)*) => {
        $(
            #[doc = concat!("Reads a `", stringify!($ty), "`.")]
            pub fn $read(&mut self, little_endian: bool) -> Result<$ty> {
                let value = self.$peek(0, little_endian)?;
                self.advance(std::mem::size_of::<$ty>())?;
                Ok(value)
            }

            #[doc = concat!("Peeks a `", stringify!($ty), "` located `offset` bytes ahead.")]
            pub fn $peek(&self, offset: usize, little_endian: bool) -> Result<$ty> {
                let bytes = self.peek_array(offset)?;
                Ok(if little_endian {
                    $ty::from_le_bytes(bytes)
                } else {
                    $ty::from_be_bytes(bytes)
                })
            }
        )*
    };
}

impl Cursor {
    /// Creates a cursor at the head of `list`.
    pub fn new(list: ChunkList) -> Self {
        Self {
            list,
            local_offset: 0,
            offset: 0,
        }
    }

    /// Creates a cursor over a single chunk.
    pub fn from_chunk(chunk: impl Into<Chunk>) -> Self {
        let mut list = ChunkList::new();
        list.append(chunk);
        Self::new(list)
    }

    /// Returns an independent cursor at the same position.
    ///
    /// Chunk payloads are shared; the list window and both offsets are not.
    pub fn copy(&self) -> Self {
        Self {
            list: self.list.copy(),
            local_offset: self.local_offset,
            offset: self.offset,
        }
    }

    /// Appends a chunk to the underlying list.
    pub fn append(&mut self, chunk: impl Into<Chunk>) -> usize {
        self.list.append(chunk)
    }

    pub fn list(&self) -> &ChunkList {
        &self.list
    }

    /// Bytes consumed since logical position zero.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Position within the chunk at the head of the list window.
    pub fn local_offset(&self) -> usize {
        self.local_offset
    }

    /// Returns `true` if at least `bytes` bytes can be read from the cursor.
    pub fn available(&self, bytes: usize) -> bool {
        bytes <= self.remaining_bytes()
    }

    /// Number of bytes that can be read from the cursor.
    pub fn remaining_bytes(&self) -> usize {
        self.list
            .available_bytes()
            .saturating_sub(self.local_offset)
    }

    /// Moves the cursor forward by `bytes`.
    pub fn advance(&mut self, bytes: usize) -> Result<()> {
        if !self.available(bytes) {
            return Err(StreamError::Underflow);
        }

        self.local_offset += bytes;
        self.offset += bytes;
        self.settle();
        Ok(())
    }

    /// Moves the cursor back by `bytes`.
    ///
    /// Any position reached before can be restored, even after the list
    /// window has been exhausted.
    pub fn rewind(&mut self, bytes: usize) -> Result<()> {
        if bytes > self.offset {
            return Err(StreamError::Underflow);
        }

        // At the end of the list, walk back from just past the last chunk.
        if self.list.first().is_none() {
            self.list.rewind();
            self.local_offset = self.list.first().map_or(0, Chunk::len);
        }

        self.offset -= bytes;
        let mut local = self.local_offset as isize - bytes as isize;
        while local < 0 && self.list.can_rewind() {
            self.list.rewind();
            local += self.list.first().map_or(0, |chunk| chunk.len() as isize);
        }
        self.local_offset = local.max(0) as usize;

        self.settle();
        Ok(())
    }

    /// Moves the cursor to the absolute stream `position`.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.offset {
            self.advance(position - self.offset)
        } else if position < self.offset {
            self.rewind(self.offset - position)
        } else {
            Ok(())
        }
    }

    /// Drops fully consumed chunks so that `local_offset` points into `first`.
    fn settle(&mut self) {
        while let Some(len) = self.list.first().map(Chunk::len) {
            if self.local_offset < len {
                break;
            }
            self.local_offset -= len;
            self.list.advance();
        }
    }

    /// Finds the chunk index and in-chunk position of the byte `offset` bytes ahead.
    fn locate(&self, offset: usize) -> Result<(usize, usize)> {
        let mut pos = self
            .local_offset
            .checked_add(offset)
            .ok_or(StreamError::Underflow)?;
        let mut index = self.list.first_index();

        while let Some(current) = index {
            let len = self.list.get(current).map_or(0, Chunk::len);
            if pos < len {
                return Ok((current, pos));
            }
            pos -= len;
            index = self.list.next(current);
        }

        Err(StreamError::Underflow)
    }

    /// Fills `out` with the bytes starting `offset` bytes ahead, across chunks.
    fn peek_into(&self, offset: usize, out: &mut [u8]) -> Result<()> {
        let end = offset
            .checked_add(out.len())
            .ok_or(StreamError::Underflow)?;
        if !self.available(end) {
            return Err(StreamError::Underflow);
        }
        if out.is_empty() {
            return Ok(());
        }

        let (mut index, mut pos) = self.locate(offset)?;
        let mut written = 0;
        loop {
            let chunk = self.list.get(index).ok_or(StreamError::Underflow)?;
            let take = (chunk.len() - pos).min(out.len() - written);
            out[written..written + take].copy_from_slice(&chunk[pos..pos + take]);
            written += take;
            if written == out.len() {
                return Ok(());
            }
            index = self.list.next(index).ok_or(StreamError::Underflow)?;
            pos = 0;
        }
    }

    fn peek_array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let mut bytes = [0u8; N];
        self.peek_into(offset, &mut bytes)?;
        Ok(bytes)
    }

    /// Reads an unsigned 8-bit integer.
    pub fn read_u8(&mut self) -> Result<u8> {
        let value = self.peek_u8(0)?;
        self.advance(1)?;
        Ok(value)
    }

    /// Peeks an unsigned 8-bit integer located `offset` bytes ahead.
    pub fn peek_u8(&self, offset: usize) -> Result<u8> {
        if !self.available(offset.saturating_add(1)) {
            return Err(StreamError::Underflow);
        }
        let (index, pos) = self.locate(offset)?;
        self.list
            .get(index)
            .map(|chunk| chunk[pos])
            .ok_or(StreamError::Underflow)
    }

    /// Reads a signed 8-bit integer.
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|value| value as i8)
    }

    /// Peeks a signed 8-bit integer located `offset` bytes ahead.
    pub fn peek_i8(&self, offset: usize) -> Result<i8> {
        self.peek_u8(offset).map(|value| value as i8)
    }

    scalar_accessors! {
        u16 => read_u16, peek_u16;
        i16 => read_i16, peek_i16;
        u32 => read_u32, peek_u32;
        i32 => read_i32, peek_i32;
        f32 => read_f32, peek_f32;
        f64 => read_f64, peek_f64;
    }

    /// Reads an unsigned 24-bit integer.
    pub fn read_u24(&mut self, little_endian: bool) -> Result<u32> {
        let value = self.peek_u24(0, little_endian)?;
        self.advance(3)?;
        Ok(value)
    }

    /// Peeks an unsigned 24-bit integer located `offset` bytes ahead.
    pub fn peek_u24(&self, offset: usize, little_endian: bool) -> Result<u32> {
        if !self.available(offset.saturating_add(3)) {
            return Err(StreamError::Underflow);
        }
        if little_endian {
            let low = self.peek_u16(offset, true)? as u32;
            let high = self.peek_u8(offset + 2)? as u32;
            Ok(low | (high << 16))
        } else {
            let high = self.peek_u16(offset, false)? as u32;
            let low = self.peek_u8(offset + 2)? as u32;
            Ok((high << 8) | low)
        }
    }

    /// Reads a signed 24-bit integer.
    pub fn read_i24(&mut self, little_endian: bool) -> Result<i32> {
        let value = self.peek_i24(0, little_endian)?;
        self.advance(3)?;
        Ok(value)
    }

    /// Peeks a signed 24-bit integer located `offset` bytes ahead.
    pub fn peek_i24(&self, offset: usize, little_endian: bool) -> Result<i32> {
        if !self.available(offset.saturating_add(3)) {
            return Err(StreamError::Underflow);
        }
        if little_endian {
            let low = self.peek_u16(offset, true)? as i32;
            let high = self.peek_i8(offset + 2)? as i32;
            Ok(low + (high << 16))
        } else {
            let high = self.peek_i16(offset, false)? as i32;
            let low = self.peek_u8(offset + 2)? as i32;
            Ok((high << 8) + low)
        }
    }

    /// Reads an 80-bit extended precision float.
    pub fn read_f80(&mut self, little_endian: bool) -> Result<f64> {
        let value = self.peek_f80(0, little_endian)?;
        self.advance(10)?;
        Ok(value)
    }

    /// Peeks an 80-bit extended precision float located `offset` bytes ahead.
    pub fn peek_f80(&self, offset: usize, little_endian: bool) -> Result<f64> {
        let mut bytes: [u8; 10] = self.peek_array(offset)?;
        if little_endian {
            bytes.reverse();
        }
        Ok(decode_f80(bytes))
    }

    /// Reads `length` bytes into a new buffer, crossing chunks as needed.
    pub fn read_buffer(&mut self, length: usize) -> Result<Vec<u8>> {
        let buffer = self.peek_buffer(0, length)?;
        self.advance(length)?;
        Ok(buffer)
    }

    /// Copies `length` bytes located `offset` bytes ahead into a new buffer.
    pub fn peek_buffer(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; length];
        self.peek_into(offset, &mut buffer)?;
        Ok(buffer)
    }

    /// Reads up to `length` bytes from the current chunk without copying.
    ///
    /// The view never extends past the end of the chunk, so it may be shorter
    /// than `length`; the cursor advances by the returned length only.
    pub fn read_single_buffer(&mut self, length: usize) -> Result<Chunk> {
        let view = self.peek_single_buffer(0, length)?;
        self.advance(view.len())?;
        Ok(view)
    }

    /// Returns a zero-copy view of up to `length` bytes starting `offset`
    /// bytes ahead, limited to the chunk that holds that first byte.
    pub fn peek_single_buffer(&self, offset: usize, length: usize) -> Result<Chunk> {
        if !self.available(offset.saturating_add(1)) {
            return Err(StreamError::Underflow);
        }
        let (index, pos) = self.locate(offset)?;
        let chunk = self.list.get(index).ok_or(StreamError::Underflow)?;
        let end = pos.saturating_add(length).min(chunk.len());
        Ok(chunk.slice(pos..end))
    }
}

impl From<ChunkList> for Cursor {
    fn from(list: ChunkList) -> Self {
        Cursor::new(list)
    }
}
