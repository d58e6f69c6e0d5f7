//! # Error Types
//!
//! Error handling for the collector link.
//!
//! This module defines all error variants that can occur while talking to the
//! collector, from socket-level failures to malformed protocol payloads.
//!
//! ## Error Categories
//! - **I/O Errors**: socket failures; these drive the reconnect cycle
//! - **Protocol Errors**: truncated or malformed payloads, unknown command ids
//! - **Link Errors**: sends attempted while the link is down
//! - **Configuration Errors**: invalid or unreadable configuration
//!
//! Nothing here is fatal to the process: a decode failure drops exactly one
//! frame, an I/O failure triggers reconnection, and a send on a down link is
//! reported synchronously to the caller without any internal retry.
//!
//! All errors implement `std::error::Error` for interoperability.

use std::io;
use thiserror::Error;

use crate::registry::DeviceAddr;

/// Primary error type for all link operations.
#[derive(Error, Debug)]
pub enum LinkError {
    /// Socket-level failure. Observing one of these in the supervisor puts
    /// the link into the reconnecting state.
    #[error("link I/O error: {0}")]
    Io(#[from] io::Error),

    /// A known command arrived with a payload the decoder could not read
    /// (typically fewer bytes than the declared shape requires). The frame is
    /// dropped; framing isolates the damage to this one message.
    #[error("malformed payload for command {cmd}: {reason}")]
    Decode {
        /// Command id of the offending frame.
        cmd: u8,
        /// What the decoder was reading when it ran out of bytes.
        reason: String,
    },

    /// A frame carried a command id this side does not process.
    #[error("unrecognized command id: {0}")]
    UnknownCommand(u8),

    /// A send was attempted while the link was not connected. Commands are
    /// not queued across disconnects; callers retry once the link is back.
    #[error("link unavailable: not connected to collector")]
    LinkUnavailable,

    /// A message or command referenced a device absent from the registry.
    /// Expected during transient join/leave races; dropped after a warning.
    #[error("address not found in device registry: {0}")]
    AddressNotFound(DeviceAddr),

    /// The supervisor task has shut down and no longer accepts commands.
    #[error("link closed")]
    Closed,

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LinkError {
    /// Build a [`LinkError::Decode`] for `cmd`.
    pub fn decode(cmd: u8, reason: impl Into<String>) -> Self {
        LinkError::Decode {
            cmd,
            reason: reason.into(),
        }
    }
}

/// Type alias for Results using [`LinkError`].
pub type Result<T> = std::result::Result<T, LinkError>;
