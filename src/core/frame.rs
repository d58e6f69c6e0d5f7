//! Frame type and header layout.
//!
//! A frame is one complete protocol message: a fixed 4-byte header followed
//! by exactly `length` payload bytes. A frame must never be dispatched until
//! all `4 + length` bytes are buffered; [`Frame::try_extract`] and the
//! [`FrameCodec`](crate::core::codec::FrameCodec) both enforce that.

use bytes::{BufMut, Bytes, BytesMut};

/// Fixed header size: u16 length + u8 subsystem + u8 command.
pub const HEADER_SIZE: usize = 4;

/// Subsystem id carried by every request this side sends to the collector.
pub const RPC_SUBSYSTEM_ID: u8 = 10;

/// One length-delimited protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Subsystem id from the header.
    pub subsystem: u8,
    /// Command id from the header; selects the decoder.
    pub cmd: u8,
    /// Payload bytes, exactly `length` of them.
    pub payload: Bytes,
}

impl Frame {
    /// Build an outbound frame on the RPC subsystem.
    pub fn request(cmd: u8, payload: impl Into<Bytes>) -> Self {
        Frame {
            subsystem: RPC_SUBSYSTEM_ID,
            cmd,
            payload: payload.into(),
        }
    }

    /// Total size on the wire, header included.
    pub fn wire_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Serialize to header + payload. Payload-less commands produce a 4-byte
    /// frame with `length = 0`.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.wire_len());
        self.write_to(&mut buf);
        buf.freeze()
    }

    /// Append the wire form of this frame to `buf`.
    pub fn write_to(&self, buf: &mut BytesMut) {
        debug_assert!(self.payload.len() <= u16::MAX as usize);
        buf.put_u16_le(self.payload.len() as u16);
        buf.put_u8(self.subsystem);
        buf.put_u8(self.cmd);
        buf.put_slice(&self.payload);
    }

    /// Attempt to extract one frame from the front of `buf`.
    ///
    /// Returns the frame and the number of bytes consumed, or `None` if the
    /// buffer does not yet hold all `4 + length` bytes. Callers drain a read
    /// by looping until `None`, since a single read may carry several frames
    /// and they must be handed on in arrival order.
    pub fn try_extract(buf: &[u8]) -> Option<(Frame, usize)> {
        if buf.len() < HEADER_SIZE {
            return None;
        }
        let length = u16::from_le_bytes([buf[0], buf[1]]) as usize;
        let total = HEADER_SIZE + length;
        if buf.len() < total {
            return None;
        }
        let frame = Frame {
            subsystem: buf[2],
            cmd: buf[3],
            payload: Bytes::copy_from_slice(&buf[HEADER_SIZE..total]),
        };
        Some((frame, total))
    }
}
