//! Bounds-checked little-endian payload access.
//!
//! Decoders read fields in a fixed left-to-right order; every read is checked
//! against the frame boundary so a truncated payload surfaces as a
//! [`LinkError::Decode`] instead of reading past the declared length.

use crate::error::{LinkError, Result};

/// Sequential little-endian reader over one frame's payload.
///
/// Carries the frame's command id so truncation errors identify the message
/// they came from.
pub struct PayloadReader<'a> {
    cmd: u8,
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    /// Start reading `buf`, attributing errors to `cmd`.
    pub fn new(cmd: u8, buf: &'a [u8]) -> Self {
        PayloadReader { cmd, buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(LinkError::decode(
                self.cmd,
                format!(
                    "truncated payload: need {n} more byte(s) at offset {}, {} remain",
                    self.pos,
                    self.remaining()
                ),
            ));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read an unsigned byte.
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// Read a signed byte.
    pub fn i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    /// Read a little-endian `u16`.
    pub fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Read a little-endian `u32`.
    pub fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a little-endian `i32`.
    pub fn i32(&mut self) -> Result<i32> {
        let b = self.take(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a little-endian `u64`.
    pub fn u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(u64::from_le_bytes(raw))
    }
}

/// Little-endian writer for outbound payloads.
#[derive(Debug, Default)]
pub struct PayloadWriter {
    buf: Vec<u8>,
}

impl PayloadWriter {
    /// Start an empty payload with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        PayloadWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append an unsigned byte.
    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.buf.push(value);
        self
    }

    /// Append a little-endian `u16`.
    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append a little-endian `u32`.
    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.buf.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append `n` zero bytes.
    pub fn pad(&mut self, n: usize) -> &mut Self {
        self.buf.resize(self.buf.len() + n, 0);
        self
    }

    /// Finish and take the payload bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fields_in_order() {
        let payload = [0x01, 0x34, 0x12, 0xFF, 0x78, 0x56, 0x34, 0x12];
        let mut reader = PayloadReader::new(9, &payload);
        assert_eq!(reader.u8().unwrap(), 0x01);
        assert_eq!(reader.u16().unwrap(), 0x1234);
        assert_eq!(reader.i8().unwrap(), -1);
        assert_eq!(reader.u32().unwrap(), 0x1234_5678);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn truncation_reports_command_and_offset() {
        let mut reader = PayloadReader::new(7, &[0x01]);
        let err = reader.u16().unwrap_err();
        match err {
            LinkError::Decode { cmd, reason } => {
                assert_eq!(cmd, 7);
                assert!(reason.contains("offset 0"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn truncation_does_not_consume() {
        let mut reader = PayloadReader::new(7, &[0xAB]);
        assert!(reader.u32().is_err());
        // The single byte is still readable afterwards.
        assert_eq!(reader.u8().unwrap(), 0xAB);
    }

    #[test]
    fn writer_produces_little_endian() {
        let mut writer = PayloadWriter::with_capacity(9);
        writer.u8(1).u16(0x1234).u32(0xAABBCCDD).pad(2);
        assert_eq!(
            writer.finish(),
            vec![0x01, 0x34, 0x12, 0xDD, 0xCC, 0xBB, 0xAA, 0x00, 0x00]
        );
    }
}
