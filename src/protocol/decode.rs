//! Per-command message decoders.
//!
//! Each inbound command id maps to exactly one decoder. Decoders read fields
//! in fixed left-to-right order through a [`PayloadReader`]; truncated or
//! malformed payloads surface as [`LinkError::Decode`] and cost exactly one
//! frame. Command ids this side does not process (including ids the protocol
//! assigns to the opposite direction) surface as
//! [`LinkError::UnknownCommand`].

use crate::core::frame::Frame;
use crate::error::{LinkError, Result};
use crate::nwk::{CoordState, NetworkDescriptor};
use crate::protocol::cmd::{CmdId, SensorMsgId};
use crate::protocol::message::{
    CapabilityInfo, ConfigRsp, DataRxInd, DeviceDescriptor, Incoming, MessageStats, SensorDataInd,
    SensorKind, SensorRecord,
};
use crate::protocol::wire::PayloadReader;
use crate::registry::DeviceAddr;

/// Source address mode: 16-bit short address follows.
const ADDR_MODE_SHORT: u8 = 2;
/// Source address mode: 64-bit extended address follows.
const ADDR_MODE_EXTENDED: u8 = 3;

/// Decode one frame into a typed message.
pub fn decode_frame(frame: &Frame) -> Result<Incoming> {
    let mut reader = PayloadReader::new(frame.cmd, &frame.payload);
    match CmdId::from_u8(frame.cmd) {
        Some(CmdId::DeviceJoinedInd) => decode_device_joined(&mut reader),
        Some(CmdId::NwkInfoInd) => {
            Ok(Incoming::NetworkInfoUpdate(decode_descriptor(&mut reader)?))
        }
        Some(CmdId::GetNwkInfoCnf) => decode_nwk_info_cnf(&mut reader),
        Some(CmdId::GetDeviceArrayCnf) => decode_device_array(&mut reader),
        Some(CmdId::DeviceNotActiveInd) => decode_not_active(&mut reader),
        Some(CmdId::DeviceDataRxInd) => decode_data_rx(&mut reader),
        Some(CmdId::CollectorStateCngInd) => {
            Ok(Incoming::StateChange(CoordState::from_u8(reader.u8()?)))
        }
        Some(CmdId::SetJoinPermitCnf) => Ok(Incoming::JoinPermitCnf {
            status: reader.u32()?,
        }),
        Some(CmdId::TxDataCnf) => Ok(Incoming::TxDataCnf),
        Some(CmdId::RmvDeviceRsp) => Ok(Incoming::RemoveDeviceRsp),
        // Ids assigned to the outbound direction, ids the gateway side never
        // processed, and anything unassigned.
        _ => Err(LinkError::UnknownCommand(frame.cmd)),
    }
}

fn decode_capability(reader: &mut PayloadReader<'_>) -> Result<CapabilityInfo> {
    Ok(CapabilityInfo {
        pan_coord: reader.u8()? != 0,
        ffd: reader.u8()? != 0,
        mains_powered: reader.u8()? != 0,
        rx_on_when_idle: reader.u8()? != 0,
        security: reader.u8()? != 0,
        alloc_addr: reader.u8()? != 0,
    })
}

fn decode_device_descriptor(reader: &mut PayloadReader<'_>) -> Result<DeviceDescriptor> {
    Ok(DeviceDescriptor {
        pan_id: reader.u16()?,
        short_addr: reader.u16()?,
        ext_addr: reader.u64()?,
        capability: decode_capability(reader)?,
    })
}

fn decode_device_joined(reader: &mut PayloadReader<'_>) -> Result<Incoming> {
    Ok(Incoming::DeviceJoined(decode_device_descriptor(reader)?))
}

fn decode_descriptor(reader: &mut PayloadReader<'_>) -> Result<NetworkDescriptor> {
    Ok(NetworkDescriptor {
        pan_id: reader.u16()?,
        coord_short_addr: reader.u16()?,
        coord_ext_addr: reader.u64()?,
        channel: reader.u8()?,
        freq_hopping: reader.u8()? != 0,
        security_enabled: reader.u8()? != 0,
        network_mode: reader.u8()?,
        state: CoordState::from_u8(reader.u8()?),
    })
}

fn decode_nwk_info_cnf(reader: &mut PayloadReader<'_>) -> Result<Incoming> {
    let status = reader.u8()?;
    let info = decode_descriptor(reader)?;
    Ok(Incoming::NetworkInfoCnf { status, info })
}

fn decode_device_array(reader: &mut PayloadReader<'_>) -> Result<Incoming> {
    let status = reader.u8()?;
    let count = reader.u16()?;
    let mut devices = Vec::with_capacity(count as usize);
    for _ in 0..count {
        devices.push(decode_device_descriptor(reader)?);
    }
    Ok(Incoming::DeviceArray { status, devices })
}

fn decode_not_active(reader: &mut PayloadReader<'_>) -> Result<Incoming> {
    Ok(Incoming::DeviceInactive {
        pan_id: reader.u16()?,
        short_addr: reader.u16()?,
        ext_addr: reader.u64()?,
        timeout: reader.u8()?,
    })
}

fn decode_data_rx(reader: &mut PayloadReader<'_>) -> Result<Incoming> {
    let addr_mode = reader.u8()?;
    let source = match addr_mode {
        ADDR_MODE_SHORT => DeviceAddr::Short(reader.u16()?),
        ADDR_MODE_EXTENDED => DeviceAddr::Extended(reader.u64()?),
        other => {
            return Err(LinkError::decode(
                CmdId::DeviceDataRxInd as u8,
                format!("unknown address mode {other}"),
            ))
        }
    };
    let rssi = reader.i8()?;
    let sub_cmd = reader.u8()?;

    match SensorMsgId::from_u8(sub_cmd) {
        Some(SensorMsgId::SensorData) => {
            let device_ext_addr = reader.u64()?;
            let frame_control = reader.u16()?;
            let mut records = Vec::new();
            // Sub-records appear only for set bits, in ascending bit order.
            for kind in SensorKind::ALL {
                if frame_control & kind.bit() != 0 {
                    records.push(decode_sensor_record(kind, reader)?);
                }
            }
            Ok(Incoming::DataRx(DataRxInd::SensorData(SensorDataInd {
                source,
                rssi,
                device_ext_addr,
                frame_control,
                records,
            })))
        }
        Some(SensorMsgId::ConfigRsp) => Ok(Incoming::DataRx(DataRxInd::ConfigResponse(
            ConfigRsp {
                source,
                rssi,
                status: reader.u16()?,
                frame_control: reader.u16()?,
                reporting_ms: reader.u32()?,
                polling_ms: reader.u32()?,
            },
        ))),
        // Other sub-commands are reported as-is; no further bytes are read,
        // so a wrong guess cannot corrupt the rest of the payload.
        _ => Ok(Incoming::DataRx(DataRxInd::Unrecognized {
            source,
            rssi,
            sub_cmd,
        })),
    }
}

fn decode_sensor_record(kind: SensorKind, reader: &mut PayloadReader<'_>) -> Result<SensorRecord> {
    Ok(match kind {
        SensorKind::Temperature => SensorRecord::Temperature {
            ambience: reader.u16()?,
            object: reader.u16()?,
        },
        SensorKind::Light => SensorRecord::Light { raw: reader.u16()? },
        SensorKind::Humidity => SensorRecord::Humidity {
            temp: reader.u16()?,
            humidity: reader.u16()?,
        },
        SensorKind::MessageStats => SensorRecord::MessageStats(MessageStats {
            join_attempts: reader.u16()?,
            join_fails: reader.u16()?,
            msgs_attempted: reader.u16()?,
            msgs_sent: reader.u16()?,
            tracking_requests: reader.u16()?,
            tracking_response_attempts: reader.u16()?,
            tracking_responses_sent: reader.u16()?,
            config_requests: reader.u16()?,
            config_response_attempts: reader.u16()?,
            config_responses_sent: reader.u16()?,
            channel_access_failures: reader.u16()?,
            mac_ack_failures: reader.u16()?,
            other_data_request_failures: reader.u16()?,
            sync_loss_indications: reader.u16()?,
            rx_decrypt_failures: reader.u16()?,
            tx_encrypt_failures: reader.u16()?,
            reset_count: reader.u16()?,
            last_reset_reason: reader.u16()?,
            join_time: reader.u16()?,
            interim_delay: reader.u16()?,
            num_broadcast_msg_rcvd: reader.u16()?,
            num_broadcast_msg_lost: reader.u16()?,
            avg_e2e_delay: reader.u16()?,
            worst_case_e2e_delay: reader.u16()?,
        }),
        SensorKind::ConfigSettings => SensorRecord::ConfigSettings {
            reporting_ms: reader.u32()?,
            polling_ms: reader.u32()?,
        },
        SensorKind::Pressure => SensorRecord::Pressure {
            temp: reader.i32()?,
            pressure: reader.u32()?,
        },
        SensorKind::Motion => SensorRecord::Motion {
            detected: reader.u8()? != 0,
        },
        SensorKind::BatteryVoltage => SensorRecord::BatteryVoltage {
            millivolts: reader.u32()?,
        },
        SensorKind::HallEffect => SensorRecord::HallEffect {
            open: reader.u8()? != 0,
            tampered: reader.u8()? != 0,
        },
        SensorKind::Fan => SensorRecord::Fan {
            speed: reader.i8()?,
        },
        SensorKind::DoorLock => SensorRecord::DoorLock {
            locked: reader.u8()? != 0,
        },
        SensorKind::WaterLeak => SensorRecord::WaterLeak {
            status: reader.u16()?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::wire::PayloadWriter;

    #[test]
    fn unknown_command_is_reported() {
        let frame = Frame {
            subsystem: 10,
            cmd: 200,
            payload: bytes::Bytes::new(),
        };
        assert!(matches!(
            decode_frame(&frame),
            Err(LinkError::UnknownCommand(200))
        ));
    }

    #[test]
    fn unprocessed_assigned_ids_are_unknown() {
        for cmd in [
            CmdId::DeviceLeftInd as u8,
            CmdId::GetNwkInfoRsp as u8,
            CmdId::GetNwkInfoReq as u8,
        ] {
            let frame = Frame {
                subsystem: 10,
                cmd,
                payload: bytes::Bytes::new(),
            };
            assert!(matches!(
                decode_frame(&frame),
                Err(LinkError::UnknownCommand(id)) if id == cmd
            ));
        }
    }

    #[test]
    fn unknown_address_mode_is_a_decode_error() {
        let mut payload = PayloadWriter::with_capacity(4);
        payload.u8(7); // neither short nor extended
        let frame = Frame::request(CmdId::DeviceDataRxInd as u8, payload.finish());
        assert!(matches!(
            decode_frame(&frame),
            Err(LinkError::Decode { cmd: 9, .. })
        ));
    }

    #[test]
    fn unrecognized_sub_command_keeps_source_and_rssi() {
        let mut payload = PayloadWriter::with_capacity(4);
        payload.u8(2).u16(0x1234).u8(0xD6).u8(42);
        let frame = Frame::request(CmdId::DeviceDataRxInd as u8, payload.finish());
        match decode_frame(&frame).unwrap() {
            Incoming::DataRx(DataRxInd::Unrecognized {
                source,
                rssi,
                sub_cmd,
            }) => {
                assert_eq!(source, DeviceAddr::Short(0x1234));
                assert_eq!(rssi, -42);
                assert_eq!(sub_cmd, 42);
            }
            other => panic!("unexpected decode: {other:?}"),
        }
    }
}
