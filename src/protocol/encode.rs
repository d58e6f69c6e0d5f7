//! Outbound frame builders.
//!
//! Every request this side can send to the collector, encoded byte-for-byte
//! the way the collector expects it. All requests ride the RPC subsystem.

use crate::core::frame::Frame;
use crate::protocol::cmd::{CmdId, SensorMsgId};
use crate::protocol::wire::PayloadWriter;

/// Join-permit duration meaning "open indefinitely".
pub const JOIN_PERMIT_OPEN: u32 = 0xFFFF_FFFF;
/// Join-permit duration meaning "closed".
pub const JOIN_PERMIT_CLOSED: u32 = 0;

/// Request the network descriptor. Sent on every (re)connect to bootstrap
/// state, and on demand.
pub fn get_network_info_req() -> Frame {
    Frame::request(CmdId::GetNwkInfoReq as u8, Vec::new())
}

/// Request the full device array.
pub fn get_device_array_req() -> Frame {
    Frame::request(CmdId::GetDeviceArrayReq as u8, Vec::new())
}

/// Open or close the network for device joins.
pub fn set_join_permit_req(open: bool) -> Frame {
    let duration = if open {
        JOIN_PERMIT_OPEN
    } else {
        JOIN_PERMIT_CLOSED
    };
    let mut payload = PayloadWriter::with_capacity(4);
    payload.u32(duration);
    Frame::request(CmdId::SetJoinPermitReq as u8, payload.finish())
}

/// Ask the collector to remove the device at `short_addr` from the network.
pub fn remove_device_req(short_addr: u16) -> Frame {
    let mut payload = PayloadWriter::with_capacity(2);
    payload.u16(short_addr);
    Frame::request(CmdId::RmvDeviceReq as u8, payload.finish())
}

/// Report that the device at `short_addr` has moved.
pub fn device_moved_ind(short_addr: u16) -> Frame {
    let mut payload = PayloadWriter::with_capacity(2);
    payload.u16(short_addr);
    Frame::request(CmdId::DevMovedInd as u8, payload.finish())
}

/// Push reporting/polling configuration and a requested sensor set to the
/// device at `short_addr`.
pub fn tx_config_req(
    short_addr: u16,
    polling_interval: u16,
    reporting_interval: u16,
    frame_control: u16,
) -> Frame {
    let mut payload = PayloadWriter::with_capacity(9);
    payload
        .u8(SensorMsgId::ConfigReq as u8)
        .u16(short_addr)
        .u16(polling_interval)
        .u16(reporting_interval)
        .u16(frame_control);
    Frame::request(CmdId::TxDataReq as u8, payload.finish())
}

/// Toggle the LED on the device at `short_addr`.
pub fn tx_toggle_req(short_addr: u16) -> Frame {
    tx_small_actuation(SensorMsgId::ToggleReq, short_addr)
}

/// Sound the buzzer on the device at `short_addr`.
pub fn tx_buzzer_req(short_addr: u16) -> Frame {
    tx_small_actuation(SensorMsgId::BuzzerCtrlReq, short_addr)
}

// The collector expects these actuation frames with a declared payload
// length of 5: sub-command, short address, then two zero bytes.
fn tx_small_actuation(sub: SensorMsgId, short_addr: u16) -> Frame {
    let mut payload = PayloadWriter::with_capacity(5);
    payload.u8(sub as u8).u16(short_addr).pad(2);
    Frame::request(CmdId::TxDataReq as u8, payload.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::frame::RPC_SUBSYSTEM_ID;

    #[test]
    fn network_info_request_is_a_bare_header() {
        let bytes = get_network_info_req().to_bytes();
        assert_eq!(bytes.as_ref(), &[0x00, 0x00, RPC_SUBSYSTEM_ID, 3]);
    }

    #[test]
    fn join_permit_open_and_closed() {
        let open = set_join_permit_req(true).to_bytes();
        assert_eq!(
            open.as_ref(),
            &[0x04, 0x00, RPC_SUBSYSTEM_ID, 11, 0xFF, 0xFF, 0xFF, 0xFF]
        );
        let closed = set_join_permit_req(false).to_bytes();
        assert_eq!(
            closed.as_ref(),
            &[0x04, 0x00, RPC_SUBSYSTEM_ID, 11, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn config_request_layout() {
        let bytes = tx_config_req(0x1234, 2000, 5000, 0x0005).to_bytes();
        assert_eq!(
            bytes.as_ref(),
            &[
                0x09, 0x00, RPC_SUBSYSTEM_ID, 13, // header, length 9
                1,    // CONFIG_REQ
                0x34, 0x12, // short address
                0xD0, 0x07, // polling 2000
                0x88, 0x13, // reporting 5000
                0x05, 0x00, // frame control
            ]
        );
    }

    #[test]
    fn toggle_request_is_padded_to_five_bytes() {
        let bytes = tx_toggle_req(0x00AB).to_bytes();
        assert_eq!(
            bytes.as_ref(),
            &[0x05, 0x00, RPC_SUBSYSTEM_ID, 13, 6, 0xAB, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn remove_device_request_layout() {
        let bytes = remove_device_req(0x5678).to_bytes();
        assert_eq!(
            bytes.as_ref(),
            &[0x02, 0x00, RPC_SUBSYSTEM_ID, 15, 0x78, 0x56]
        );
    }
}
