//! Tokio codec for framing the collector byte stream.
//!
//! Wraps [`Frame`] extraction in a [`tokio_util::codec`] `Decoder`/`Encoder`
//! pair so the supervisor can drive the connection through `Framed`. The
//! decoder is chunk-invariant: however the stream is split across reads, the
//! emitted frame sequence is identical to decoding the whole buffer at once.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::core::frame::{Frame, HEADER_SIZE};
use crate::error::LinkError;

/// Codec turning a raw byte stream into [`Frame`]s and back.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = LinkError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, LinkError> {
        if src.len() < HEADER_SIZE {
            // Not even a full header yet.
            src.reserve(HEADER_SIZE - src.len());
            return Ok(None);
        }
        let length = u16::from_le_bytes([src[0], src[1]]) as usize;
        let total = HEADER_SIZE + length;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }
        let wire = src.split_to(total).freeze();
        Ok(Some(Frame {
            subsystem: wire[2],
            cmd: wire[3],
            payload: wire.slice(HEADER_SIZE..),
        }))
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = LinkError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), LinkError> {
        dst.reserve(frame.wire_len());
        frame.write_to(dst);
        Ok(())
    }
}
