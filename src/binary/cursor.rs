use super::errors::HeaderError as Error;
use crate::utils;
use std::io::{self, Read, Seek, SeekFrom};

type Result<T> = std::result::Result<T, Error>;

/// Bounds-checked sequential reader over a seekable byte source
///
/// The total length of the source is taken once on construction, and every
/// read is checked against the bytes remaining before anything is allocated.
/// A read that cannot be satisfied in full fails with
/// [`HeaderError::TruncatedInput`](super::HeaderError::TruncatedInput) and
/// consumes nothing.
#[derive(Debug)]
pub struct ByteCursor<R> {
    inner: R,
    position: u64,
    len: u64,
}

impl<'a> ByteCursor<io::Cursor<&'a [u8]>> {
    /// Cursor over an in-memory buffer
    pub fn from_slice(data: &'a [u8]) -> ByteCursor<io::Cursor<&'a [u8]>> {
        ByteCursor {
            inner: io::Cursor::new(data),
            position: 0,
            len: data.len() as u64,
        }
    }
}

impl<R: Read + Seek> ByteCursor<R> {
    /// Wrap a seekable source, positioned at its first byte
    pub fn new(mut inner: R) -> Result<ByteCursor<R>> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(ByteCursor {
            inner,
            position: 0,
            len,
        })
    }

    /// Current byte offset from the start of the source
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Bytes left between the current offset and the end of the source
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    /// Move to an absolute offset
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.len {
            return Err(Error::TruncatedInput {
                offset: self.len,
                needed: offset - self.len,
                remaining: 0,
            });
        }
        self.inner.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    fn ensure(&self, needed: u64) -> Result<()> {
        if needed > self.remaining() {
            Err(self.truncated(needed))
        } else {
            Ok(())
        }
    }

    fn truncated(&self, needed: u64) -> Error {
        Error::TruncatedInput {
            offset: self.position,
            needed,
            remaining: self.remaining(),
        }
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.ensure(buf.len() as u64)?;
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.position += buf.len() as u64;
                Ok(())
            }
            // The source shrank underneath us
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(self.truncated(buf.len() as u64))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read exactly `len` bytes
    pub fn read_exact(&mut self, len: usize) -> Result<Vec<u8>> {
        self.ensure(len as u64)?;
        let mut buffer = utils::buffer(len);
        self.fill(&mut buffer)?;
        Ok(buffer)
    }

    /// Read a fixed size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buffer = [0u8; N];
        self.fill(&mut buffer)?;
        Ok(buffer)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little endian u16
    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little endian u32
    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little endian u64
    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read an unsigned little endian integer `width` bytes wide (1, 2, 4 or 8)
    pub fn read_le(&mut self, width: usize) -> Result<u64> {
        debug_assert!(matches!(width, 1 | 2 | 4 | 8), "bad integer width {}", width);
        let bytes = self.read_exact(width)?;
        Ok(utils::le_to_u64(&bytes))
    }

    /// Read `len` bytes as UTF-8 text
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        let offset = self.position;
        let bytes = self.read_exact(len)?;
        String::from_utf8(bytes).map_err(|_| Error::InvalidEncoding { offset })
    }

    /// Read `len` bytes and return them as lowercase hex
    pub fn read_hex(&mut self, len: usize) -> Result<String> {
        Ok(hex::encode(self.read_exact(len)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_widths() -> Result<()> {
        let data = [
            0x01, 0x02, 0x01, 0x04, 0x03, 0x02, 0x01, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02,
            0x01,
        ];
        let mut cursor = ByteCursor::from_slice(&data);
        assert_eq!(cursor.read_le(1)?, 0x01);
        assert_eq!(cursor.read_le(2)?, 0x0102);
        assert_eq!(cursor.read_le(4)?, 0x0102_0304);
        assert_eq!(cursor.read_le(8)?, 0x0102_0304_0506_0708);
        assert_eq!(cursor.position(), 15);
        assert_eq!(cursor.remaining(), 0);
        Ok(())
    }

    #[test]
    fn short_read_is_truncation_and_consumes_nothing() {
        let data = [0xAAu8; 3];
        let mut cursor = ByteCursor::from_slice(&data);
        match cursor.read_u32_le() {
            Err(Error::TruncatedInput {
                offset,
                needed,
                remaining,
            }) => {
                assert_eq!(offset, 0);
                assert_eq!(needed, 4);
                assert_eq!(remaining, 3);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn huge_length_fails_before_allocating() {
        let data = [0u8; 8];
        let mut cursor = ByteCursor::from_slice(&data);
        assert!(matches!(
            cursor.read_exact(usize::MAX),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn invalid_utf8_reports_offset() {
        let data = [b'o', b'k', 0xFF, 0xFE];
        let mut cursor = ByteCursor::from_slice(&data);
        assert_eq!(cursor.read_string(2).unwrap(), "ok");
        assert!(matches!(
            cursor.read_string(2),
            Err(Error::InvalidEncoding { offset: 2 })
        ));
    }

    #[test]
    fn seek_and_reread() -> Result<()> {
        let data = [0xDE, 0xAD, 0xBE, 0xEF];
        let mut cursor = ByteCursor::new(io::Cursor::new(data.to_vec()))?;
        assert_eq!(cursor.remaining(), 4);
        cursor.read_exact(4)?;
        cursor.seek(0)?;
        assert_eq!(cursor.read_hex(4)?, "deadbeef");
        assert!(cursor.seek(5).is_err());
        Ok(())
    }
}
