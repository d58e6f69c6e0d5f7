//! # Network State
//!
//! The latest known network descriptor: PAN id, channel, security mode and
//! the coordinator's state. Created by the first successful network-info
//! confirmation and thereafter updated by network-update and state-change
//! indications. There is at most one descriptor per running link.

use serde::{Deserialize, Serialize};

/// Coordinator state as reported by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordState {
    /// Waiting for initialization to begin.
    InitWaiting,
    /// Restoring a previously commissioned network.
    InitRestoring,
    /// Network started.
    Started,
    /// Previously commissioned network restored.
    Restored,
    /// Open for device joins.
    JoinAllowed,
    /// Closed for device joins.
    JoinNotAllowed,
    /// A state value this side does not know.
    Other(u8),
}

impl CoordState {
    /// Map a wire byte to a state.
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            1 => CoordState::InitWaiting,
            2 => CoordState::InitRestoring,
            3 => CoordState::Started,
            4 => CoordState::Restored,
            5 => CoordState::JoinAllowed,
            6 => CoordState::JoinNotAllowed,
            other => CoordState::Other(other),
        }
    }

    /// The wire byte for this state.
    pub fn as_u8(self) -> u8 {
        match self {
            CoordState::InitWaiting => 1,
            CoordState::InitRestoring => 2,
            CoordState::Started => 3,
            CoordState::Restored => 4,
            CoordState::JoinAllowed => 5,
            CoordState::JoinNotAllowed => 6,
            CoordState::Other(byte) => byte,
        }
    }
}

/// Descriptor of the wireless network behind the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// PAN identifier.
    pub pan_id: u16,
    /// Coordinator's short address.
    pub coord_short_addr: u16,
    /// Coordinator's 64-bit address.
    pub coord_ext_addr: u64,
    /// Radio channel in use.
    pub channel: u8,
    /// Frequency hopping enabled.
    pub freq_hopping: bool,
    /// Network security enabled.
    pub security_enabled: bool,
    /// Raw network mode byte.
    pub network_mode: u8,
    /// Coordinator state.
    pub state: CoordState,
}

impl NetworkDescriptor {
    /// Overwrite every field from a newer wire descriptor. Update
    /// indications carry the full field set, so a merge is a full assign.
    pub fn merge_update(&mut self, update: &NetworkDescriptor) {
        *self = update.clone();
    }

    /// Apply a state-change indication, leaving other fields untouched.
    pub fn set_state(&mut self, state: CoordState) {
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_state_byte_roundtrip() {
        for byte in 0u8..=10 {
            assert_eq!(CoordState::from_u8(byte).as_u8(), byte);
        }
    }

    #[test]
    fn state_change_leaves_other_fields() {
        let mut descriptor = NetworkDescriptor {
            pan_id: 0xACDC,
            coord_short_addr: 0,
            coord_ext_addr: 0x00124B000001,
            channel: 11,
            freq_hopping: false,
            security_enabled: true,
            network_mode: 1,
            state: CoordState::Started,
        };
        descriptor.set_state(CoordState::JoinAllowed);
        assert_eq!(descriptor.state, CoordState::JoinAllowed);
        assert_eq!(descriptor.pan_id, 0xACDC);
        assert!(descriptor.security_enabled);
    }
}
