//! Buffered sequential writer, the encoding counterpart of [`Cursor`](crate::Cursor).

use std::io::{Seek, SeekFrom, Write};

use log::debug;

use crate::float80::encode_f80;
use crate::{Encoding, WriterError};

/// Default capacity of the internal buffer.
pub const BUFFER_SIZE: usize = 65536;

/// A writer that encodes values into a fixed-capacity buffer and flushes it
/// to a sink whenever the next value would not fit.
///
/// Dropping the writer does not flush. Call [`end`](StreamWriter::end) (or
/// [`flush`](StreamWriter::flush)) once the last value is written, otherwise
/// the pending bytes never reach the sink.
///
/// # Example
///
/// ```
/// use chunkstream::{Cursor, StreamWriter};
///
/// let mut writer = StreamWriter::new(Vec::new());
/// writer.write_u16(0x0102, true)?;
/// writer.write_string("hi", "utf8", true)?;
/// let bytes = writer.end()?;
/// assert_eq!(bytes, vec![0x02, 0x01, b'h', b'i', 0]);
///
/// let mut cursor = Cursor::from_chunk(bytes);
/// assert_eq!(cursor.read_u16(true).unwrap(), 0x0102);
/// assert_eq!(cursor.read_string(None, "utf8").unwrap(), "hi");
/// # Ok::<(), chunkstream::WriterError>(())
/// ```
pub struct StreamWriter<W: Write> {
    sink: W,
    buffer: Vec<u8>,
    capacity: usize,
    offset: u64,
}

impl<W: Write> StreamWriter<W> {
    /// Creates a writer with a [`BUFFER_SIZE`] byte buffer.
    pub fn new(sink: W) -> Self {
        Self::with_capacity(sink, BUFFER_SIZE)
    }

    /// Creates a writer with a custom buffer capacity.
    pub fn with_capacity(sink: W, capacity: usize) -> Self {
        Self {
            sink,
            buffer: Vec::with_capacity(capacity),
            capacity,
            offset: 0,
        }
    }

    /// Total number of bytes written, flushed or not.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Bytes waiting in the buffer.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    /// Pushes buffered bytes to the sink.
    pub fn flush(&mut self) -> Result<(), WriterError> {
        if !self.buffer.is_empty() {
            debug!("flushing {} buffered bytes", self.buffer.len());
            self.sink.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Flushes everything, including the sink itself, and returns the sink.
    pub fn end(mut self) -> Result<W, WriterError> {
        self.flush()?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    /// Makes room for `bytes` more bytes, flushing if the buffer would overflow.
    pub fn ensure(&mut self, bytes: usize) -> Result<(), WriterError> {
        if self.buffer.len() + bytes > self.capacity {
            self.flush()?;
        }
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        self.ensure(bytes.len())?;
        self.buffer.extend_from_slice(bytes);
        self.offset += bytes.len() as u64;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<(), WriterError> {
        self.put(&[value])
    }

    pub fn write_i8(&mut self, value: i8) -> Result<(), WriterError> {
        self.put(&value.to_be_bytes())
    }

    pub fn write_u16(&mut self, value: u16, little_endian: bool) -> Result<(), WriterError> {
        let bytes = if little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.put(&bytes)
    }

    pub fn write_i16(&mut self, value: i16, little_endian: bool) -> Result<(), WriterError> {
        self.write_u16(value as u16, little_endian)
    }

    /// Writes the low 24 bits of `value`.
    pub fn write_u24(&mut self, value: u32, little_endian: bool) -> Result<(), WriterError> {
        let [_, b1, b2, b3] = value.to_be_bytes();
        if little_endian {
            self.put(&[b3, b2, b1])
        } else {
            self.put(&[b1, b2, b3])
        }
    }

    /// Writes `value` as a 24-bit two's-complement integer.
    pub fn write_i24(&mut self, value: i32, little_endian: bool) -> Result<(), WriterError> {
        self.write_u24(value as u32 & 0x00ff_ffff, little_endian)
    }

    pub fn write_u32(&mut self, value: u32, little_endian: bool) -> Result<(), WriterError> {
        let bytes = if little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.put(&bytes)
    }

    pub fn write_i32(&mut self, value: i32, little_endian: bool) -> Result<(), WriterError> {
        self.write_u32(value as u32, little_endian)
    }

    pub fn write_f32(&mut self, value: f32, little_endian: bool) -> Result<(), WriterError> {
        self.write_u32(value.to_bits(), little_endian)
    }

    pub fn write_f64(&mut self, value: f64, little_endian: bool) -> Result<(), WriterError> {
        let bytes = if little_endian {
            value.to_le_bytes()
        } else {
            value.to_be_bytes()
        };
        self.put(&bytes)
    }

    /// Writes `value` as an 80-bit extended precision float.
    pub fn write_f80(&mut self, value: f64, little_endian: bool) -> Result<(), WriterError> {
        let mut bytes = encode_f80(value);
        if little_endian {
            bytes.reverse();
        }
        self.put(&bytes)
    }

    /// Flushes pending bytes, then writes `bytes` straight to the sink.
    pub fn write_buffer(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        self.flush()?;
        self.sink.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    /// Writes `text` in the named encoding, optionally followed by a terminator
    /// one code unit wide.
    pub fn write_string(
        &mut self,
        text: &str,
        encoding: &str,
        null_terminated: bool,
    ) -> Result<(), WriterError> {
        let encoding = encoding
            .parse::<Encoding>()
            .map_err(|_| WriterError::UnknownEncoding(encoding.to_string()))?;
        self.write_text(text, encoding, null_terminated)
    }

    /// Writes `text` in `encoding`, optionally followed by a terminator.
    pub fn write_text(
        &mut self,
        text: &str,
        encoding: Encoding,
        null_terminated: bool,
    ) -> Result<(), WriterError> {
        let mut bytes = encode_text(text, encoding)?;
        if null_terminated {
            bytes.resize(bytes.len() + encoding.unit_size(), 0);
        }

        if bytes.len() < self.capacity {
            self.put(&bytes)
        } else {
            self.write_buffer(&bytes)
        }
    }
}

impl<W: Write + Seek> StreamWriter<W> {
    /// Flushes pending bytes and moves the sink to `position`.
    pub fn seek(&mut self, position: u64) -> Result<(), WriterError> {
        self.flush()?;
        self.sink.seek(SeekFrom::Start(position))?;
        self.offset = position;
        Ok(())
    }
}

fn encode_text(text: &str, encoding: Encoding) -> Result<Vec<u8>, WriterError> {
    match encoding {
        Encoding::Ascii | Encoding::Latin1 => text
            .chars()
            .map(|ch| {
                u8::try_from(ch).map_err(|_| WriterError::Unencodable {
                    ch,
                    encoding: encoding.name(),
                })
            })
            .collect(),
        Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
        Encoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        Encoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
        Encoding::Utf16Bom => Ok(std::iter::once(0xfeff)
            .chain(text.encode_utf16())
            .flat_map(u16::to_be_bytes)
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor as IoCursor;

    #[test]
    fn test_scalars() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_u8(0xff).unwrap();
        writer.write_i8(-2).unwrap();
        writer.write_u16(0x0102, false).unwrap();
        writer.write_i16(-2, true).unwrap();
        writer.write_u24(0x123456, false).unwrap();
        writer.write_i24(-2, true).unwrap();
        writer.write_u32(0x01020304, true).unwrap();
        assert_eq!(writer.offset(), 16);
        assert_eq!(
            writer.end().unwrap(),
            vec![
                0xff, 0xfe, 0x01, 0x02, 0xfe, 0xff, 0x12, 0x34, 0x56, 0xfe, 0xff, 0xff, 0x04,
                0x03, 0x02, 0x01
            ],
        );
    }

    #[test]
    fn test_auto_flush() {
        let mut writer = StreamWriter::with_capacity(Vec::new(), 4);
        writer.write_u32(1, false).unwrap();
        assert!(writer.get_ref().is_empty());
        writer.write_u8(2).unwrap();
        assert_eq!(writer.get_ref(), &vec![0, 0, 0, 1]);
        assert_eq!(writer.pending(), &[2]);
    }

    #[test]
    fn test_pending_bytes_need_end() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_u16(0xabcd, false).unwrap();
        assert!(writer.get_ref().is_empty());
        assert_eq!(writer.pending(), &[0xab, 0xcd]);
        assert_eq!(writer.end().unwrap(), vec![0xab, 0xcd]);
    }

    #[test]
    fn test_write_buffer_flushes_first() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_u8(1).unwrap();
        writer.write_buffer(&[2, 3]).unwrap();
        assert_eq!(writer.get_ref(), &vec![1, 2, 3]);
        assert_eq!(writer.offset(), 3);
    }

    #[test]
    fn test_write_string_encodings() {
        let mut writer = StreamWriter::new(Vec::new());
        writer.write_string("é", "latin1", false).unwrap();
        writer.write_string("é", "utf8", true).unwrap();
        writer.write_string("A", "utf16le", true).unwrap();
        writer.write_string("A", "utf16bom", false).unwrap();
        assert_eq!(
            writer.end().unwrap(),
            vec![0xe9, 0xc3, 0xa9, 0, 0x41, 0, 0, 0, 0xfe, 0xff, 0, 0x41]
        );
    }

    #[test]
    fn test_write_string_errors() {
        let mut writer = StreamWriter::new(Vec::new());
        assert!(matches!(
            writer.write_string("日", "ascii", false),
            Err(WriterError::Unencodable { ch: '日', .. })
        ));
        assert!(matches!(
            writer.write_string("x", "ebcdic", false),
            Err(WriterError::UnknownEncoding(name)) if name == "ebcdic"
        ));
        assert_eq!(writer.offset(), 0);
    }

    #[test]
    fn test_large_string_bypasses_buffer() {
        let mut writer = StreamWriter::with_capacity(Vec::new(), 4);
        writer.write_string("abcdef", "ascii", false).unwrap();
        assert_eq!(writer.get_ref(), &b"abcdef".to_vec());
        assert!(writer.pending().is_empty());
    }

    #[test]
    fn test_seek() {
        let mut writer = StreamWriter::new(IoCursor::new(Vec::new()));
        writer.write_u32(0, false).unwrap();
        writer.seek(1).unwrap();
        writer.write_u8(7).unwrap();
        let sink = writer.end().unwrap();
        assert_eq!(sink.into_inner(), vec![0, 7, 0, 0]);
    }
}
