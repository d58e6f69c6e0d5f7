//! # Core Wire Format
//!
//! Low-level frame handling and the tokio codec for byte streams.
//!
//! This module is the foundation of the link: it turns an arbitrary-boundary
//! byte stream into discrete frames and serializes outbound frames back into
//! the same format.
//!
//! ## Wire Format
//! ```text
//! [Length(2, LE)] [Subsystem(1)] [Command(1)] [Payload(N)]
//! ```
//!
//! `Length` counts payload bytes only. There is no checksum or CRC; integrity
//! relies on the reliability of the underlying stream transport.

pub mod codec;
pub mod frame;

pub use codec::FrameCodec;
pub use frame::{Frame, HEADER_SIZE, RPC_SUBSYSTEM_ID};
