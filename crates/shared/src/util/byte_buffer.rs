// ByteBuffer - Binary asset serialization/deserialization
// Every mapview asset is big-endian (most significant byte first)

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::Cursor;

/// A byte buffer for reading/writing binary asset data.
/// Reads are bounds-checked; running off the end yields `UnexpectedEof`.
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read_pos: usize,
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(data: Vec<u8>) -> Self {
        ByteBuffer { data, read_pos: 0 }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(data: &[u8]) -> Self {
        ByteBuffer::from(data.to_vec())
    }
}

fn eof(what: &str, pos: usize, len: usize) -> std::io::Error {
    std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        format!("ByteBuffer {what} read past end (pos={pos}, size={len})"),
    )
}

impl ByteBuffer {
    /// Create a new empty ByteBuffer
    pub fn new() -> Self {
        ByteBuffer {
            data: Vec::new(),
            read_pos: 0,
        }
    }

    /// Create with a pre-allocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        ByteBuffer {
            data: Vec::with_capacity(capacity),
            read_pos: 0,
        }
    }

    /// Get the current size of the buffer
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the current read position
    pub fn read_pos(&self) -> usize {
        self.read_pos
    }

    /// Bytes left between the read position and the end
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.read_pos)
    }

    /// Consume the buffer, returning the raw bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    // ---- Write operations (append) ----

    /// Append raw bytes
    pub fn append(&mut self, data: &[u8]) {
        self.data.extend_from_slice(data);
    }

    /// Write a u8
    pub fn write_u8(&mut self, val: u8) {
        self.data.push(val);
    }

    /// Write a u16 (big-endian)
    pub fn write_u16(&mut self, val: u16) {
        let mut raw = [0u8; 2];
        BigEndian::write_u16(&mut raw, val);
        self.data.extend_from_slice(&raw);
    }

    /// Write an i16 (big-endian, two's complement)
    pub fn write_i16(&mut self, val: i16) {
        let mut raw = [0u8; 2];
        BigEndian::write_i16(&mut raw, val);
        self.data.extend_from_slice(&raw);
    }

    /// Write a u32 (big-endian)
    pub fn write_u32(&mut self, val: u32) {
        let mut raw = [0u8; 4];
        BigEndian::write_u32(&mut raw, val);
        self.data.extend_from_slice(&raw);
    }

    // ---- Positional reads ----

    fn slice_at(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        self.data.get(offset..end)
    }

    /// Unsigned byte at `offset`
    pub fn get_ubyte(&self, offset: usize) -> Result<u8, std::io::Error> {
        self.data
            .get(offset)
            .copied()
            .ok_or_else(|| eof("ubyte", offset, self.data.len()))
    }

    /// Big-endian u16 at `offset`
    pub fn get_uint16(&self, offset: usize) -> Result<u16, std::io::Error> {
        match self.slice_at(offset, 2) {
            Some(raw) => Ok(BigEndian::read_u16(raw)),
            None => Err(eof("uint16", offset, self.data.len())),
        }
    }

    /// Big-endian i16 at `offset`; values above 0x7FFF come back negative
    pub fn get_int16(&self, offset: usize) -> Result<i16, std::io::Error> {
        match self.slice_at(offset, 2) {
            Some(raw) => Ok(BigEndian::read_i16(raw)),
            None => Err(eof("int16", offset, self.data.len())),
        }
    }

    // ---- Sequential reads ----

    /// Read a u8
    pub fn read_u8(&mut self) -> Result<u8, std::io::Error> {
        let val = self.get_ubyte(self.read_pos)?;
        self.read_pos += 1;
        Ok(val)
    }

    /// Read a u16 (big-endian)
    pub fn read_u16(&mut self) -> Result<u16, std::io::Error> {
        if self.read_pos + 2 > self.data.len() {
            return Err(eof("u16", self.read_pos, self.data.len()));
        }
        let mut cursor = Cursor::new(&self.data[self.read_pos..]);
        let val = cursor.read_u16::<BigEndian>()?;
        self.read_pos += 2;
        Ok(val)
    }

    /// Read an i16 (big-endian)
    pub fn read_i16(&mut self) -> Result<i16, std::io::Error> {
        if self.read_pos + 2 > self.data.len() {
            return Err(eof("i16", self.read_pos, self.data.len()));
        }
        let mut cursor = Cursor::new(&self.data[self.read_pos..]);
        let val = cursor.read_i16::<BigEndian>()?;
        self.read_pos += 2;
        Ok(val)
    }

    /// Read a u32 (big-endian)
    pub fn read_u32(&mut self) -> Result<u32, std::io::Error> {
        if self.read_pos + 4 > self.data.len() {
            return Err(eof("u32", self.read_pos, self.data.len()));
        }
        let mut cursor = Cursor::new(&self.data[self.read_pos..]);
        let val = cursor.read_u32::<BigEndian>()?;
        self.read_pos += 4;
        Ok(val)
    }

    /// Read N bytes into a new vector
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, std::io::Error> {
        let bytes = match self.slice_at(self.read_pos, count) {
            Some(raw) => raw.to_vec(),
            None => return Err(eof("bytes", self.read_pos, self.data.len())),
        };
        self.read_pos += count;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_u8() {
        let mut buf = ByteBuffer::new();
        buf.write_u8(42);
        assert_eq!(buf.read_u8().unwrap(), 42);
    }

    #[test]
    fn test_u16_is_big_endian() {
        let mut buf = ByteBuffer::from(vec![0x12, 0x34]);
        assert_eq!(buf.get_uint16(0).unwrap(), 0x1234);
        assert_eq!(buf.read_u16().unwrap(), 0x1234);
    }

    #[test]
    fn test_int16_sign_extends() {
        let buf = ByteBuffer::from(vec![0xFF, 0xFE, 0x7F, 0xFF, 0x80, 0x00]);
        assert_eq!(buf.get_int16(0).unwrap(), -2);
        assert_eq!(buf.get_int16(2).unwrap(), 0x7FFF);
        assert_eq!(buf.get_int16(4).unwrap(), i16::MIN);
    }

    #[test]
    fn test_write_read_u32() {
        let mut buf = ByteBuffer::new();
        buf.write_u32(0xDEADBEEF);
        assert_eq!(buf.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(buf.into_inner(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_read_past_end() {
        let mut buf = ByteBuffer::from(vec![1u8]);
        let err = buf.read_u16().unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
        assert_eq!(buf.read_pos(), 0);
        assert!(buf.get_ubyte(1).is_err());
        assert!(buf.get_int16(usize::MAX - 1).is_err());
    }

    #[test]
    fn test_append_bytes() {
        let mut buf = ByteBuffer::new();
        buf.append(&[1, 2, 3, 4]);
        assert_eq!(buf.size(), 4);
        buf.read_bytes(3).unwrap();
        assert_eq!(buf.remaining(), 1);
    }
}
