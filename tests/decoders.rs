//! End-to-end decoding of collector indications and confirmations.

use collector_link::protocol::message::{
    DataRxInd, Incoming, SensorKind, SensorRecord, NWK_INFO_STARTED,
};
use collector_link::{decode_frame, CoordState, DeviceAddr, Frame, LinkError};

/// Growable little-endian payload builder for hand-written wire images.
#[derive(Default)]
struct Payload(Vec<u8>);

impl Payload {
    fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }
    fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn u64(mut self, v: u64) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }
    fn capability(self, rx_on_when_idle: bool) -> Self {
        self.u8(0)
            .u8(1)
            .u8(0)
            .u8(rx_on_when_idle as u8)
            .u8(1)
            .u8(1)
    }
    fn frame(self, cmd: u8) -> Frame {
        Frame::request(cmd, self.0)
    }
}

const EXT_A: u64 = 0x00124B000F8E3A01;
const EXT_B: u64 = 0x00124B000F8E3A02;

#[test]
fn nwk_info_cnf_started_carries_full_descriptor() {
    let frame = Payload::default()
        .u8(NWK_INFO_STARTED)
        .u16(0xACDC) // pan
        .u16(0x0000) // coordinator short
        .u64(EXT_A)
        .u8(11) // channel
        .u8(0) // frequency hopping
        .u8(1) // security
        .u8(1) // mode
        .u8(5) // state
        .frame(5);

    match decode_frame(&frame).unwrap() {
        Incoming::NetworkInfoCnf { status, info } => {
            assert_eq!(status, NWK_INFO_STARTED);
            assert_eq!(info.pan_id, 0xACDC);
            assert_eq!(info.coord_ext_addr, EXT_A);
            assert_eq!(info.channel, 11);
            assert!(!info.freq_hopping);
            assert!(info.security_enabled);
            assert_eq!(info.state, CoordState::JoinAllowed);
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn nwk_info_cnf_not_started_still_decodes() {
    let frame = Payload::default()
        .u8(0)
        .u16(0xFFFF)
        .u16(0xFFFF)
        .u64(0)
        .u8(0)
        .u8(0)
        .u8(0)
        .u8(0)
        .u8(1)
        .frame(5);

    match decode_frame(&frame).unwrap() {
        Incoming::NetworkInfoCnf { status, .. } => assert_eq!(status, 0),
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn device_array_cnf_decodes_each_entry() {
    let frame = Payload::default()
        .u8(0) // status
        .u16(2) // count
        .u16(0xACDC)
        .u16(0x0001)
        .u64(EXT_A)
        .capability(false)
        .u16(0xACDC)
        .u16(0x0002)
        .u64(EXT_B)
        .capability(true)
        .frame(7);

    match decode_frame(&frame).unwrap() {
        Incoming::DeviceArray { status, devices } => {
            assert_eq!(status, 0);
            assert_eq!(devices.len(), 2);
            assert_eq!(devices[0].short_addr, 0x0001);
            assert_eq!(devices[0].ext_addr, EXT_A);
            assert!(!devices[0].capability.rx_on_when_idle);
            assert_eq!(devices[1].short_addr, 0x0002);
            assert!(devices[1].capability.rx_on_when_idle);
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn device_array_short_one_entry_is_a_decode_error() {
    // Count says two but only one descriptor follows.
    let frame = Payload::default()
        .u8(0)
        .u16(2)
        .u16(0xACDC)
        .u16(0x0001)
        .u64(EXT_A)
        .capability(false)
        .frame(7);

    assert!(matches!(
        decode_frame(&frame),
        Err(LinkError::Decode { cmd: 7, .. })
    ));
}

#[test]
fn sensor_data_reads_only_advertised_records() {
    // Temperature (0x0001) and humidity (0x0004); the light record between
    // them is absent and must not be read.
    let frame = Payload::default()
        .u8(2) // short address mode
        .u16(0x0001)
        .u8(0xC4) // rssi -60
        .u8(5) // sensor data
        .u64(EXT_A)
        .u16(0x0005)
        .u16(2150) // ambience
        .u16(2300) // object
        .u16(2101) // humidity sensor temp
        .u16(4200) // humidity
        .frame(9);

    match decode_frame(&frame).unwrap() {
        Incoming::DataRx(DataRxInd::SensorData(ind)) => {
            assert_eq!(ind.source, DeviceAddr::Short(0x0001));
            assert_eq!(ind.rssi, -60);
            assert_eq!(ind.device_ext_addr, EXT_A);
            assert_eq!(ind.frame_control, 0x0005);
            assert_eq!(
                ind.records,
                vec![
                    SensorRecord::Temperature {
                        ambience: 2150,
                        object: 2300,
                    },
                    SensorRecord::Humidity {
                        temp: 2101,
                        humidity: 4200,
                    },
                ]
            );
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn sensor_data_extended_source_address() {
    let frame = Payload::default()
        .u8(3) // extended address mode
        .u64(EXT_B)
        .u8(0xD0)
        .u8(5)
        .u64(EXT_B)
        .u16(0x0002) // light only
        .u16(812)
        .frame(9);

    match decode_frame(&frame).unwrap() {
        Incoming::DataRx(DataRxInd::SensorData(ind)) => {
            assert_eq!(ind.source, DeviceAddr::Extended(EXT_B));
            assert_eq!(ind.records, vec![SensorRecord::Light { raw: 812 }]);
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn sensor_data_truncated_record_is_a_decode_error() {
    // Battery voltage advertised, only two of four bytes present.
    let frame = Payload::default()
        .u8(2)
        .u16(0x0001)
        .u8(0xC4)
        .u8(5)
        .u64(EXT_A)
        .u16(0x0080)
        .u16(3300)
        .frame(9);

    assert!(matches!(
        decode_frame(&frame),
        Err(LinkError::Decode { cmd: 9, .. })
    ));
}

#[test]
fn sensor_data_all_kinds_decode_in_bit_order() {
    let mut payload = Payload::default()
        .u8(2)
        .u16(0x0003)
        .u8(0xCE)
        .u8(5)
        .u64(EXT_A)
        .u16(0x0FFF);
    payload = payload.u16(1).u16(2); // temperature
    payload = payload.u16(3); // light
    payload = payload.u16(4).u16(5); // humidity
    for n in 0..24u16 {
        payload = payload.u16(n); // message stats
    }
    payload = payload.u32(90_000).u32(6_000); // config settings
    payload = payload.u32(2_200).u32(101_325); // pressure (temp as i32 bits)
    payload = payload.u8(1); // motion
    payload = payload.u32(2987); // battery
    payload = payload.u8(1).u8(0); // hall effect
    payload = payload.u8(0xFF); // fan speed -1
    payload = payload.u8(1); // door lock
    payload = payload.u16(7); // water leak

    match decode_frame(&payload.frame(9)).unwrap() {
        Incoming::DataRx(DataRxInd::SensorData(ind)) => {
            assert_eq!(ind.records.len(), 12);
            let kinds: Vec<SensorKind> = ind.records.iter().map(|r| r.kind()).collect();
            assert_eq!(kinds, SensorKind::ALL.to_vec());
            assert_eq!(ind.records[9], SensorRecord::Fan { speed: -1 });
            assert_eq!(ind.records[11], SensorRecord::WaterLeak { status: 7 });
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn config_rsp_decodes_fixed_shape() {
    let frame = Payload::default()
        .u8(2)
        .u16(0x0002)
        .u8(0xCE)
        .u8(2) // config response
        .u16(0) // status success
        .u16(0x0085)
        .u32(90_000)
        .u32(6_000)
        .frame(9);

    match decode_frame(&frame).unwrap() {
        Incoming::DataRx(DataRxInd::ConfigResponse(rsp)) => {
            assert_eq!(rsp.source, DeviceAddr::Short(0x0002));
            assert_eq!(rsp.status, 0);
            assert_eq!(rsp.frame_control, 0x0085);
            assert_eq!(rsp.reporting_ms, 90_000);
            assert_eq!(rsp.polling_ms, 6_000);
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn not_active_ind_decodes() {
    let frame = Payload::default()
        .u16(0xACDC)
        .u16(0x0002)
        .u64(EXT_B)
        .u8(3)
        .frame(8);

    match decode_frame(&frame).unwrap() {
        Incoming::DeviceInactive {
            pan_id,
            short_addr,
            ext_addr,
            timeout,
        } => {
            assert_eq!(pan_id, 0xACDC);
            assert_eq!(short_addr, 0x0002);
            assert_eq!(ext_addr, EXT_B);
            assert_eq!(timeout, 3);
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}

#[test]
fn state_change_maps_known_and_unknown_states() {
    let frame = Payload::default().u8(5).frame(10);
    assert_eq!(
        decode_frame(&frame).unwrap(),
        Incoming::StateChange(CoordState::JoinAllowed)
    );

    let frame = Payload::default().u8(99).frame(10);
    assert_eq!(
        decode_frame(&frame).unwrap(),
        Incoming::StateChange(CoordState::Other(99))
    );
}

#[test]
fn join_permit_cnf_and_bodyless_confirmations() {
    let frame = Payload::default().u32(0).frame(12);
    assert_eq!(
        decode_frame(&frame).unwrap(),
        Incoming::JoinPermitCnf { status: 0 }
    );

    assert_eq!(
        decode_frame(&Payload::default().frame(14)).unwrap(),
        Incoming::TxDataCnf
    );
    assert_eq!(
        decode_frame(&Payload::default().frame(16)).unwrap(),
        Incoming::RemoveDeviceRsp
    );
}

#[test]
fn device_joined_ind_decodes_descriptor() {
    let frame = Payload::default()
        .u16(0xACDC)
        .u16(0x0003)
        .u64(EXT_A)
        .capability(true)
        .frame(0);

    match decode_frame(&frame).unwrap() {
        Incoming::DeviceJoined(desc) => {
            assert_eq!(desc.pan_id, 0xACDC);
            assert_eq!(desc.short_addr, 0x0003);
            assert_eq!(desc.ext_addr, EXT_A);
            assert!(desc.capability.ffd);
            assert!(desc.capability.rx_on_when_idle);
        }
        other => panic!("unexpected decode: {other:?}"),
    }
}
