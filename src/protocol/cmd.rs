//! Command identifiers.
//!
//! Two id spaces exist: the outer frame command id (header byte 3) and the
//! sensor-message sub-command id carried inside `DEVICE_DATA_RX_IND` and
//! `TX_DATA_REQ` payloads.

/// Frame-level command id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CmdId {
    /// A device joined the network.
    DeviceJoinedInd = 0,
    /// A device left the network (not processed by this side).
    DeviceLeftInd = 1,
    /// Unsolicited network descriptor update.
    NwkInfoInd = 2,
    /// Request the network descriptor (outbound, empty payload).
    GetNwkInfoReq = 3,
    /// Server-side response form (not processed by this side).
    GetNwkInfoRsp = 4,
    /// Confirmation for [`CmdId::GetNwkInfoReq`].
    GetNwkInfoCnf = 5,
    /// Request the full device array (outbound, empty payload).
    GetDeviceArrayReq = 6,
    /// Confirmation carrying the full device array.
    GetDeviceArrayCnf = 7,
    /// A device stopped reporting.
    DeviceNotActiveInd = 8,
    /// Sensor telemetry or config response from a device.
    DeviceDataRxInd = 9,
    /// Coordinator state changed.
    CollectorStateCngInd = 10,
    /// Open or close the network for joins (outbound).
    SetJoinPermitReq = 11,
    /// Confirmation for [`CmdId::SetJoinPermitReq`].
    SetJoinPermitCnf = 12,
    /// Wrap a sensor sub-command for a device (outbound).
    TxDataReq = 13,
    /// Confirmation for [`CmdId::TxDataReq`] (acknowledged, not decoded).
    TxDataCnf = 14,
    /// Remove a device from the network (outbound).
    RmvDeviceReq = 15,
    /// Response to a remove request; triggers a device-array refresh.
    RmvDeviceRsp = 16,
    /// Report that a device moved (outbound).
    DevMovedInd = 17,
}

impl CmdId {
    /// Map a header command byte to its id, if assigned.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(CmdId::DeviceJoinedInd),
            1 => Some(CmdId::DeviceLeftInd),
            2 => Some(CmdId::NwkInfoInd),
            3 => Some(CmdId::GetNwkInfoReq),
            4 => Some(CmdId::GetNwkInfoRsp),
            5 => Some(CmdId::GetNwkInfoCnf),
            6 => Some(CmdId::GetDeviceArrayReq),
            7 => Some(CmdId::GetDeviceArrayCnf),
            8 => Some(CmdId::DeviceNotActiveInd),
            9 => Some(CmdId::DeviceDataRxInd),
            10 => Some(CmdId::CollectorStateCngInd),
            11 => Some(CmdId::SetJoinPermitReq),
            12 => Some(CmdId::SetJoinPermitCnf),
            13 => Some(CmdId::TxDataReq),
            14 => Some(CmdId::TxDataCnf),
            15 => Some(CmdId::RmvDeviceReq),
            16 => Some(CmdId::RmvDeviceRsp),
            17 => Some(CmdId::DevMovedInd),
            _ => None,
        }
    }
}

/// Sensor-message sub-command id, nested inside data frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorMsgId {
    /// Push configuration to a device.
    ConfigReq = 1,
    /// Device's response to a config request.
    ConfigRsp = 2,
    /// Tracking request (collector internal, not processed here).
    TrackingReq = 3,
    /// Tracking response (collector internal, not processed here).
    TrackingRsp = 4,
    /// Bitmask-gated telemetry report.
    SensorData = 5,
    /// Toggle the device's LED.
    ToggleReq = 6,
    /// Response to a toggle request.
    ToggleRsp = 7,
    /// Drive the device's buzzer.
    BuzzerCtrlReq = 112,
    /// Response to a buzzer request.
    BuzzerCtrlRsp = 113,
}

impl SensorMsgId {
    /// Map a sub-command byte to its id, if assigned.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(SensorMsgId::ConfigReq),
            2 => Some(SensorMsgId::ConfigRsp),
            3 => Some(SensorMsgId::TrackingReq),
            4 => Some(SensorMsgId::TrackingRsp),
            5 => Some(SensorMsgId::SensorData),
            6 => Some(SensorMsgId::ToggleReq),
            7 => Some(SensorMsgId::ToggleRsp),
            112 => Some(SensorMsgId::BuzzerCtrlReq),
            113 => Some(SensorMsgId::BuzzerCtrlRsp),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_id_byte_roundtrip() {
        for byte in 0u8..=17 {
            let id = CmdId::from_u8(byte).expect("assigned id");
            assert_eq!(id as u8, byte);
        }
        assert!(CmdId::from_u8(18).is_none());
        assert!(CmdId::from_u8(0xFF).is_none());
    }

    #[test]
    fn sensor_msg_id_byte_roundtrip() {
        for byte in [1u8, 2, 3, 4, 5, 6, 7, 112, 113] {
            let id = SensorMsgId::from_u8(byte).expect("assigned id");
            assert_eq!(id as u8, byte);
        }
        assert!(SensorMsgId::from_u8(0).is_none());
        assert!(SensorMsgId::from_u8(8).is_none());
    }
}
