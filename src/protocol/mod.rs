//! # Protocol Layer
//!
//! Command identifiers, typed messages, and the per-command decoders and
//! encoders sitting between the frame codec and the link supervisor.
//!
//! ## Components
//! - **cmd**: frame command ids and sensor sub-command ids
//! - **wire**: bounds-checked little-endian payload reader/writer
//! - **message**: typed decoded messages and the sensor tagged union
//! - **decode**: frame → [`message::Incoming`]
//! - **encode**: outbound request builders

pub mod cmd;
pub mod decode;
pub mod encode;
pub mod message;
pub mod wire;

pub use cmd::{CmdId, SensorMsgId};
pub use decode::decode_frame;
pub use message::Incoming;
