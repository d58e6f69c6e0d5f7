//! Cloneable application-facing surface of the link.

use tokio::sync::{broadcast, mpsc, watch};

use crate::error::{LinkError, Result};
use crate::link::{LinkEvent, LinkState};
use crate::registry::DeviceAddr;

/// A command for a specific device, addressed by registry identity.
///
/// The supervisor resolves the address to the device's current short address
/// at send time; commands for unknown devices are dropped with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Push reporting/polling intervals and a requested sensor set.
    Config {
        /// Requested polling interval in milliseconds.
        polling_interval: u16,
        /// Requested reporting interval in milliseconds.
        reporting_interval: u16,
        /// Sensor kinds the device should report, as a frame-control mask.
        frame_control: u16,
    },
    /// Toggle the device's LED.
    Toggle,
    /// Sound the device's buzzer.
    Buzzer,
}

/// Commands accepted by the supervisor task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Request the current network descriptor from the collector.
    GetNetworkInfo,
    /// Open or close the network to new joiners.
    SetJoinPermit {
        /// `true` opens the network indefinitely, `false` closes it.
        open: bool,
    },
    /// Send a command to one device.
    Device {
        /// Registry identity of the target.
        addr: DeviceAddr,
        /// What to send.
        command: DeviceCommand,
    },
    /// Ask the collector to remove a device from the network.
    RemoveDevice {
        /// Registry identity of the target.
        addr: DeviceAddr,
    },
    /// Tell the collector a device has physically moved.
    DeviceMoved {
        /// Registry identity of the target.
        addr: DeviceAddr,
    },
    /// Stop the supervisor task.
    Shutdown,
}

/// Handle to a running link. Cheap to clone; all clones address the same
/// supervisor task.
#[derive(Debug, Clone)]
pub struct LinkHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
    state_rx: watch::Receiver<LinkState>,
    events: broadcast::Sender<LinkEvent>,
}

impl LinkHandle {
    pub(crate) fn new(
        cmd_tx: mpsc::UnboundedSender<Command>,
        state_rx: watch::Receiver<LinkState>,
        events: broadcast::Sender<LinkEvent>,
    ) -> Self {
        LinkHandle {
            cmd_tx,
            state_rx,
            events,
        }
    }

    /// Current connection state.
    pub fn state(&self) -> LinkState {
        *self.state_rx.borrow()
    }

    /// Whether commands would currently be accepted.
    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// A watch receiver for observing state transitions.
    pub fn watch_state(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }

    /// Subscribe to link notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<LinkEvent> {
        self.events.subscribe()
    }

    /// Request a fresh network descriptor.
    pub fn request_network_info(&self) -> Result<()> {
        self.send_connected(Command::GetNetworkInfo)
    }

    /// Open or close the network to new joiners.
    pub fn set_join_permit(&self, open: bool) -> Result<()> {
        self.send_connected(Command::SetJoinPermit { open })
    }

    /// Send a command to the device identified by `addr`.
    pub fn send_device_command(
        &self,
        addr: impl Into<DeviceAddr>,
        command: DeviceCommand,
    ) -> Result<()> {
        self.send_connected(Command::Device {
            addr: addr.into(),
            command,
        })
    }

    /// Request removal of the device identified by `addr`.
    pub fn remove_device(&self, addr: impl Into<DeviceAddr>) -> Result<()> {
        self.send_connected(Command::RemoveDevice { addr: addr.into() })
    }

    /// Report that the device identified by `addr` has moved.
    pub fn device_moved(&self, addr: impl Into<DeviceAddr>) -> Result<()> {
        self.send_connected(Command::DeviceMoved { addr: addr.into() })
    }

    /// Stop the supervisor task. Accepted in any state.
    pub fn shutdown(&self) -> Result<()> {
        self.cmd_tx
            .send(Command::Shutdown)
            .map_err(|_| LinkError::Closed)
    }

    // Commands other than shutdown are only meaningful on a live connection,
    // and nothing is queued across disconnects. Checking here makes failures
    // synchronous at the call site instead of silent drops in the supervisor.
    fn send_connected(&self, command: Command) -> Result<()> {
        if self.state() != LinkState::Connected {
            return Err(LinkError::LinkUnavailable);
        }
        self.cmd_tx.send(command).map_err(|_| LinkError::Closed)
    }
}
