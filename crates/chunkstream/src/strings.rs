//! Text decoding on top of [`Cursor`].
//!
//! Strings are decoded incrementally through peeks, so a string may span any
//! number of chunks. A `length` of `None` reads up to a terminator: a zero
//! byte for single-byte encodings, a zero unit for UTF-16. The terminator is
//! consumed but not returned. A multi-byte sequence that starts inside the
//! requested length is always completed, even if it ends past it.

use crate::{Cursor, Encoding, Result, StreamError};

impl Cursor {
    /// Reads a string in the named encoding and advances past it.
    ///
    /// # Example
    ///
    /// ```
    /// use chunkstream::Cursor;
    ///
    /// let mut cursor = Cursor::from_chunk(b"hello\0world".to_vec());
    /// assert_eq!(cursor.read_string(None, "ascii")?, "hello");
    /// assert_eq!(cursor.offset(), 6);
    /// assert_eq!(cursor.read_string(Some(5), "utf8")?, "world");
    /// # Ok::<(), chunkstream::StreamError>(())
    /// ```
    pub fn read_string(&mut self, length: Option<usize>, encoding: &str) -> Result<String> {
        self.read_text(length, encoding.parse()?)
    }

    /// Decodes a string in the named encoding `offset` bytes ahead.
    pub fn peek_string(
        &self,
        offset: usize,
        length: Option<usize>,
        encoding: &str,
    ) -> Result<String> {
        self.peek_text(offset, length, encoding.parse()?)
    }

    /// Reads a string and advances by the bytes consumed, including any
    /// terminator or byte-order mark.
    pub fn read_text(&mut self, length: Option<usize>, encoding: Encoding) -> Result<String> {
        let (text, consumed) = self.decode_text(0, length, encoding)?;
        self.advance(consumed)?;
        Ok(text)
    }

    /// Decodes a string `offset` bytes ahead without moving the cursor.
    pub fn peek_text(
        &self,
        offset: usize,
        length: Option<usize>,
        encoding: Encoding,
    ) -> Result<String> {
        self.decode_text(offset, length, encoding)
            .map(|(text, _)| text)
    }

    /// Returns the decoded text and the position just past the last byte used.
    fn decode_text(
        &self,
        offset: usize,
        length: Option<usize>,
        encoding: Encoding,
    ) -> Result<(String, usize)> {
        let end = length.map(|length| offset.saturating_add(length));
        let window = Window {
            end,
            terminated: length.is_none(),
        };

        match encoding {
            Encoding::Ascii | Encoding::Latin1 => self.decode_latin1(offset, window),
            Encoding::Utf8 => self.decode_utf8(offset, window),
            Encoding::Utf16Be => self.decode_utf16(offset, window, false),
            Encoding::Utf16Le => self.decode_utf16(offset, window, true),
            Encoding::Utf16Bom => {
                let mark = match length {
                    Some(length) if length < 2 => 0,
                    _ => self.peek_u16(offset, false)?,
                };
                if mark == 0 {
                    return Ok((String::new(), offset + 2));
                }
                self.decode_utf16(offset + 2, window, mark == 0xfffe)
            }
        }
    }

    fn decode_latin1(&self, mut pos: usize, window: Window) -> Result<(String, usize)> {
        let mut text = String::new();
        while window.contains(pos) {
            let byte = self.peek_u8(pos)?;
            pos += 1;
            if window.terminated && byte == 0 {
                break;
            }
            text.push(char::from(byte));
        }
        Ok((text, pos))
    }

    fn decode_utf8(&self, mut pos: usize, window: Window) -> Result<(String, usize)> {
        let mut text = String::new();
        while window.contains(pos) {
            let lead = self.peek_u8(pos)?;
            pos += 1;
            if window.terminated && lead == 0 {
                break;
            }

            // (continuation bytes, payload bits, smallest code point for the length)
            let (continuation, mut code_point, min) = match lead {
                0x00..=0x7f => (0, lead as u32, 0),
                0xc2..=0xdf => (1, (lead & 0x1f) as u32, 0x80),
                0xe0..=0xef => (2, (lead & 0x0f) as u32, 0x800),
                0xf0..=0xf4 => (3, (lead & 0x07) as u32, 0x10000),
                _ => return Err(StreamError::InvalidUtf8),
            };
            for _ in 0..continuation {
                let byte = self.peek_u8(pos)?;
                pos += 1;
                if byte & 0xc0 != 0x80 {
                    return Err(StreamError::InvalidUtf8);
                }
                code_point = (code_point << 6) | (byte & 0x3f) as u32;
            }

            if code_point < min {
                return Err(StreamError::InvalidUtf8);
            }
            text.push(char::from_u32(code_point).ok_or(StreamError::InvalidUtf8)?);
        }
        Ok((text, pos))
    }

    fn decode_utf16(
        &self,
        mut pos: usize,
        window: Window,
        little_endian: bool,
    ) -> Result<(String, usize)> {
        let mut text = String::new();
        while window.contains(pos) {
            let unit = self.peek_u16(pos, little_endian)?;
            pos += 2;
            if window.terminated && unit == 0 {
                break;
            }

            let ch = match unit {
                0xd800..=0xdbff => {
                    let low = self.peek_u16(pos, little_endian)?;
                    if !(0xdc00..=0xdfff).contains(&low) {
                        return Err(StreamError::InvalidUtf16);
                    }
                    pos += 2;
                    let code_point =
                        0x10000 + (((unit as u32 - 0xd800) << 10) | (low as u32 - 0xdc00));
                    char::from_u32(code_point)
                }
                0xdc00..=0xdfff => return Err(StreamError::InvalidUtf16),
                _ => char::from_u32(unit as u32),
            };
            text.push(ch.ok_or(StreamError::InvalidUtf16)?);
        }
        Ok((text, pos))
    }
}

/// Bounds of a string being decoded.
#[derive(Clone, Copy)]
struct Window {
    end: Option<usize>,
    terminated: bool,
}

impl Window {
    fn contains(self, pos: usize) -> bool {
        self.end.map_or(true, |end| pos < end)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ChunkList, Cursor, StreamError};

    fn make_cursor(bytes: &[u8]) -> Cursor {
        let mut list = ChunkList::new();
        // split into two chunks to exercise cross-chunk decoding
        let mid = bytes.len() / 2;
        list.append(bytes[..mid].to_vec());
        list.append(bytes[mid..].to_vec());
        Cursor::new(list)
    }

    #[test]
    fn test_ascii() {
        let mut cursor = make_cursor(&[0x68, 0x65, 0x6c, 0x6c, 0x6f]);
        assert_eq!(cursor.peek_string(0, Some(5), "ascii").unwrap(), "hello");
        assert_eq!(cursor.peek_string(0, Some(5), "latin1").unwrap(), "hello");
        assert_eq!(cursor.read_string(Some(5), "ascii").unwrap(), "hello");
        assert_eq!(cursor.offset(), 5);
    }

    #[test]
    fn test_ascii_null_terminated() {
        let mut cursor = make_cursor(&[0x68, 0x65, 0x6c, 0x6c, 0x6f, 0]);
        assert_eq!(cursor.peek_string(0, Some(6), "ascii").unwrap(), "hello\0");
        assert_eq!(cursor.peek_string(0, None, "ascii").unwrap(), "hello");
        assert_eq!(cursor.read_string(None, "ascii").unwrap(), "hello");
        assert_eq!(cursor.offset(), 6);
    }

    #[test]
    fn test_latin1_high_bytes() {
        let mut cursor = make_cursor(&[0xfc, 0x62, 0x65, 0x72]);
        assert_eq!(cursor.read_string(Some(4), "latin1").unwrap(), "über");
    }

    #[test]
    fn test_missing_terminator_underflows() {
        let mut cursor = make_cursor(b"abc");
        assert_eq!(
            cursor.read_string(None, "ascii"),
            Err(StreamError::Underflow),
        );
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_utf8() {
        let cases: [(&[u8], &str); 4] = [
            (&[195, 188, 98, 101, 114], "über"),
            (
                &[0xc3, 0xb6, 0xe6, 0x97, 0xa5, 0xe6, 0x9c, 0xac, 0xe8, 0xaa, 0x9e],
                "ö日本語",
            ),
            (&[0xf0, 0x9f, 0x91, 0x8d], "\u{1f44d}"),
            (&[0xe2, 0x82, 0xac], "€"),
        ];
        for (bytes, expected) in cases {
            let mut cursor = make_cursor(bytes);
            assert_eq!(
                cursor.peek_string(0, Some(bytes.len()), "utf8").unwrap(),
                expected,
            );
            assert_eq!(
                cursor.read_string(Some(bytes.len()), "UTF-8").unwrap(),
                expected,
            );
            assert_eq!(cursor.offset(), bytes.len());
        }
    }

    #[test]
    fn test_utf8_null_terminated() {
        let mut cursor = make_cursor(&[0xf0, 0x9f, 0x91, 0x8d, 0, 0x41]);
        assert_eq!(cursor.peek_string(0, None, "utf-8").unwrap(), "\u{1f44d}");
        assert_eq!(cursor.read_string(None, "utf8").unwrap(), "\u{1f44d}");
        assert_eq!(cursor.offset(), 5);
        assert_eq!(cursor.read_string(Some(1), "utf8").unwrap(), "A");
    }

    #[test]
    fn test_utf8_invalid() {
        let cursor = make_cursor(&[0x41, 0x80, 0x41]);
        assert_eq!(
            cursor.peek_string(0, Some(3), "utf8"),
            Err(StreamError::InvalidUtf8),
        );

        let cursor = make_cursor(&[0xc3, 0x41]);
        assert_eq!(
            cursor.peek_string(0, Some(2), "utf8"),
            Err(StreamError::InvalidUtf8),
        );
    }

    #[test]
    fn test_utf8_overlong() {
        // an overlong NUL must not hide inside a terminated string
        let mut cursor = make_cursor(&[b'a', 0xc0, 0x80, b'b', 0]);
        assert_eq!(
            cursor.read_string(None, "utf8"),
            Err(StreamError::InvalidUtf8),
        );
        assert_eq!(cursor.offset(), 0);

        let cases: [&[u8]; 4] = [
            &[0xc1, 0xbf],
            &[0xe0, 0x80, 0xaf],
            &[0xf0, 0x80, 0x80, 0x80],
            &[0xf5, 0x80, 0x80, 0x80],
        ];
        for bytes in cases {
            let cursor = make_cursor(bytes);
            assert_eq!(
                cursor.peek_string(0, Some(bytes.len()), "utf8"),
                Err(StreamError::InvalidUtf8),
                "{bytes:02x?}"
            );
        }

        // shortest forms at each length still decode
        let cursor = make_cursor(&[0xc2, 0x80, 0xe0, 0xa0, 0x80, 0xf0, 0x90, 0x80, 0x80]);
        assert_eq!(
            cursor.peek_string(0, Some(9), "utf8").unwrap(),
            "\u{80}\u{800}\u{10000}"
        );
    }

    #[test]
    fn test_utf16be() {
        let mut cursor = make_cursor(&[4, 63, 4, 64, 4, 56, 4, 50, 4, 53, 4, 66]);
        assert_eq!(
            cursor.peek_string(0, Some(12), "utf16be").unwrap(),
            "привет",
        );
        assert_eq!(cursor.read_string(Some(12), "utf16be").unwrap(), "привет");
        assert_eq!(cursor.offset(), 12);

        let mut cursor = make_cursor(&[0xd8, 0x3d, 0xdc, 0x4d, 0, 0]);
        assert_eq!(
            cursor.peek_string(0, None, "utf16-be").unwrap(),
            "\u{1f44d}",
        );
        assert_eq!(cursor.read_string(None, "utf16-be").unwrap(), "\u{1f44d}");
        assert_eq!(cursor.offset(), 6);
    }

    #[test]
    fn test_utf16le() {
        let mut cursor = make_cursor(&[
            0x42, 0x30, 0x44, 0x30, 0x46, 0x30, 0x48, 0x30, 0x4a, 0x30,
        ]);
        assert_eq!(cursor.peek_string(0, Some(10), "utf16le").unwrap(), "あいうえお");
        assert_eq!(cursor.read_string(Some(10), "utf16le").unwrap(), "あいうえお");
        assert_eq!(cursor.offset(), 10);

        let mut cursor = make_cursor(&[252, 0, 98, 0, 101, 0, 114, 0, 0, 0]);
        assert_eq!(cursor.read_string(None, "utf16-le").unwrap(), "über");
        assert_eq!(cursor.offset(), 10);
    }

    #[test]
    fn test_utf16_invalid_surrogates() {
        // lone high surrogate
        let cursor = make_cursor(&[0xd8, 0x3d, 0x00, 0x41]);
        assert_eq!(
            cursor.peek_string(0, Some(4), "utf16be"),
            Err(StreamError::InvalidUtf16),
        );

        // low surrogate first
        let cursor = make_cursor(&[0xdc, 0x4d, 0xd8, 0x3d]);
        assert_eq!(
            cursor.peek_string(0, Some(4), "utf16be"),
            Err(StreamError::InvalidUtf16),
        );
    }

    #[test]
    fn test_utf16bom() {
        let mut cursor = make_cursor(&[0xfe, 0xff, 0, 252, 0, 98, 0, 101, 0, 114]);
        assert_eq!(cursor.peek_string(0, Some(10), "utf16bom").unwrap(), "über");
        assert_eq!(cursor.read_string(Some(10), "utf16bom").unwrap(), "über");
        assert_eq!(cursor.offset(), 10);

        let mut cursor = make_cursor(&[0xff, 0xfe, 0x3d, 0xd8, 0x4d, 0xdc, 0, 0]);
        assert_eq!(
            cursor.peek_string(0, None, "utf16-bom").unwrap(),
            "\u{1f44d}",
        );
        assert_eq!(cursor.read_string(None, "utf16-bom").unwrap(), "\u{1f44d}");
        assert_eq!(cursor.offset(), 8);
    }

    #[test]
    fn test_utf16bom_missing_mark() {
        let mut cursor = make_cursor(&[0, 0, 0x41, 0]);
        assert_eq!(cursor.read_string(None, "utf16bom").unwrap(), "");
        assert_eq!(cursor.offset(), 2);

        let mut cursor = make_cursor(&[0xfe, 0xff, 0x41, 0]);
        assert_eq!(cursor.read_string(Some(1), "utf16bom").unwrap(), "");
        assert_eq!(cursor.offset(), 2);
    }

    #[test]
    fn test_unknown_encoding() {
        let mut cursor = make_cursor(b"abc");
        assert_eq!(
            cursor.read_string(Some(3), "ucs2"),
            Err(StreamError::UnknownEncoding("ucs2".to_string()))
        );
        assert_eq!(cursor.offset(), 0);
    }

    #[test]
    fn test_peek_at_offset() {
        let cursor = make_cursor(b"xxhello");
        assert_eq!(cursor.peek_string(2, Some(5), "ascii").unwrap(), "hello");
        assert_eq!(cursor.offset(), 0);
    }
}
