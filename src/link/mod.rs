//! # Collector Link
//!
//! Supervised TCP connection to the wireless collector.
//!
//! ## Components
//! - [`CollectorLink`]: spawns the supervisor task and hands back a handle
//! - [`LinkHandle`]: cloneable command/query surface for the rest of the app
//! - [`LinkState`]: coarse connection state, observable through a watch channel
//! - [`LinkEvent`]: broadcast notifications about network and device changes
//!
//! The supervisor owns the socket, the device registry, and the current
//! network descriptor. Everything else talks to it through the handle. A lost
//! connection is retried forever at a fixed delay; commands issued while the
//! link is down fail synchronously with [`LinkError::LinkUnavailable`] rather
//! than queueing.
//!
//! [`LinkError::LinkUnavailable`]: crate::error::LinkError::LinkUnavailable

pub mod handle;
pub mod supervisor;

pub use handle::{Command, DeviceCommand, LinkHandle};
pub use supervisor::CollectorLink;

use crate::nwk::NetworkDescriptor;
use crate::registry::DeviceRecord;

/// Coarse connection state of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Not connected and not trying. Initial and terminal state.
    Disconnected,
    /// First connection attempt in progress.
    Connecting,
    /// Stream is up; commands are accepted.
    Connected,
    /// Connection lost; waiting out the reconnect delay or retrying.
    Reconnecting,
}

/// Notifications broadcast to subscribers as collector traffic is processed.
///
/// Slow subscribers that fall behind the configured channel capacity lose the
/// oldest notifications; every event carries full state, so a missed event is
/// recovered by the next one of the same kind.
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// The network descriptor changed (startup, unsolicited update, or a
    /// coordinator state transition).
    NetworkInfoChanged(NetworkDescriptor),
    /// A single device record changed.
    DeviceUpdated(DeviceRecord),
    /// The registry was replaced wholesale from a device-array confirmation.
    DeviceArrayReplaced(Vec<DeviceRecord>),
    /// The collector confirmed a join-permit request; zero means success.
    JoinPermitConfirmed(u32),
}
