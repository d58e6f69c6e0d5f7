//! Typed protocol messages.
//!
//! Everything a decoder can produce lives here: the [`Incoming`] message
//! enum, device capability and descriptor records, and the tagged
//! [`SensorRecord`] union for bitmask-gated telemetry sub-records.
//!
//! The set of sensor kinds a device reports is whatever the frame-control
//! mask of the *current* message says it is; it may change between messages
//! and is never assumed stable.

use serde::{Deserialize, Serialize};

use crate::nwk::{CoordState, NetworkDescriptor};
use crate::registry::DeviceAddr;

/// Device capability flags, one wire byte each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityInfo {
    /// Device is the PAN coordinator.
    pub pan_coord: bool,
    /// Full-function device.
    pub ffd: bool,
    /// Mains powered (not battery).
    pub mains_powered: bool,
    /// Receiver stays on while idle.
    pub rx_on_when_idle: bool,
    /// Capable of secured communication.
    pub security: bool,
    /// Wants a network-allocated short address.
    pub alloc_addr: bool,
}

/// A device as described on the wire by join indications and the full
/// device-array confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// PAN the device belongs to.
    pub pan_id: u16,
    /// Network-assigned 16-bit address; may be reassigned over time.
    pub short_addr: u16,
    /// Globally unique 64-bit address; the stable identity.
    pub ext_addr: u64,
    /// Capability flags.
    pub capability: CapabilityInfo,
}

/// Sensor kinds, in frame-control bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    /// Ambient + object temperature, bit 0x0001.
    Temperature,
    /// Raw light reading, bit 0x0002.
    Light,
    /// Temperature + relative humidity, bit 0x0004.
    Humidity,
    /// Link statistics counters, bit 0x0008.
    MessageStats,
    /// Reporting/polling configuration echo, bit 0x0010.
    ConfigSettings,
    /// Barometric pressure, bit 0x0020.
    Pressure,
    /// Motion detection, bit 0x0040.
    Motion,
    /// Battery voltage, bit 0x0080.
    BatteryVoltage,
    /// Door/window hall-effect state, bit 0x0100.
    HallEffect,
    /// Fan speed, bit 0x0200.
    Fan,
    /// Door lock state, bit 0x0400.
    DoorLock,
    /// Water leak state, bit 0x0800.
    WaterLeak,
}

impl SensorKind {
    /// All kinds in ascending bit-position order. Sub-records appear on the
    /// wire in exactly this order, and only for set bits.
    pub const ALL: [SensorKind; 12] = [
        SensorKind::Temperature,
        SensorKind::Light,
        SensorKind::Humidity,
        SensorKind::MessageStats,
        SensorKind::ConfigSettings,
        SensorKind::Pressure,
        SensorKind::Motion,
        SensorKind::BatteryVoltage,
        SensorKind::HallEffect,
        SensorKind::Fan,
        SensorKind::DoorLock,
        SensorKind::WaterLeak,
    ];

    /// The frame-control bit gating this kind's sub-record.
    pub fn bit(self) -> u16 {
        match self {
            SensorKind::Temperature => 0x0001,
            SensorKind::Light => 0x0002,
            SensorKind::Humidity => 0x0004,
            SensorKind::MessageStats => 0x0008,
            SensorKind::ConfigSettings => 0x0010,
            SensorKind::Pressure => 0x0020,
            SensorKind::Motion => 0x0040,
            SensorKind::BatteryVoltage => 0x0080,
            SensorKind::HallEffect => 0x0100,
            SensorKind::Fan => 0x0200,
            SensorKind::DoorLock => 0x0400,
            SensorKind::WaterLeak => 0x0800,
        }
    }
}

/// Per-message link statistics reported by a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStats {
    /// Join attempts made.
    pub join_attempts: u16,
    /// Join attempts that failed.
    pub join_fails: u16,
    /// Data messages attempted.
    pub msgs_attempted: u16,
    /// Data messages sent.
    pub msgs_sent: u16,
    /// Tracking requests received.
    pub tracking_requests: u16,
    /// Tracking response attempts.
    pub tracking_response_attempts: u16,
    /// Tracking responses sent.
    pub tracking_responses_sent: u16,
    /// Config requests received.
    pub config_requests: u16,
    /// Config response attempts.
    pub config_response_attempts: u16,
    /// Config responses sent.
    pub config_responses_sent: u16,
    /// Channel access failures.
    pub channel_access_failures: u16,
    /// MAC ACK failures.
    pub mac_ack_failures: u16,
    /// Other data request failures.
    pub other_data_request_failures: u16,
    /// Sync loss indications.
    pub sync_loss_indications: u16,
    /// Receive decrypt failures.
    pub rx_decrypt_failures: u16,
    /// Transmit encrypt failures.
    pub tx_encrypt_failures: u16,
    /// Device reset count.
    pub reset_count: u16,
    /// Reason for the last reset.
    pub last_reset_reason: u16,
    /// Time taken to join, in units reported by the device.
    pub join_time: u16,
    /// Interim delay.
    pub interim_delay: u16,
    /// Broadcast messages received.
    pub num_broadcast_msg_rcvd: u16,
    /// Broadcast messages lost.
    pub num_broadcast_msg_lost: u16,
    /// Average end-to-end delay.
    pub avg_e2e_delay: u16,
    /// Worst-case end-to-end delay.
    pub worst_case_e2e_delay: u16,
}

/// One decoded telemetry sub-record. The payload shape of each variant is
/// fixed once the kind is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorRecord {
    /// Ambient and object temperature.
    Temperature {
        /// Ambient temperature reading.
        ambience: u16,
        /// Object temperature reading.
        object: u16,
    },
    /// Raw light sensor reading.
    Light {
        /// Uncalibrated sensor value.
        raw: u16,
    },
    /// Humidity sensor reading.
    Humidity {
        /// Sensor-local temperature.
        temp: u16,
        /// Relative humidity.
        humidity: u16,
    },
    /// Link statistics counters.
    MessageStats(MessageStats),
    /// Configuration the device is currently running.
    ConfigSettings {
        /// Reporting interval in milliseconds.
        reporting_ms: u32,
        /// Polling interval in milliseconds.
        polling_ms: u32,
    },
    /// Pressure sensor reading; the temperature is signed.
    Pressure {
        /// Sensor-local temperature.
        temp: i32,
        /// Pressure value.
        pressure: u32,
    },
    /// Motion detection state.
    Motion {
        /// True when motion was detected.
        detected: bool,
    },
    /// Battery voltage.
    BatteryVoltage {
        /// Voltage in millivolts.
        millivolts: u32,
    },
    /// Hall-effect (door/window) state.
    HallEffect {
        /// True when open.
        open: bool,
        /// True when tampered.
        tampered: bool,
    },
    /// Fan state; speed is signed.
    Fan {
        /// Current fan speed.
        speed: i8,
    },
    /// Door lock state.
    DoorLock {
        /// True when locked.
        locked: bool,
    },
    /// Water leak state.
    WaterLeak {
        /// Raw leak status.
        status: u16,
    },
}

impl SensorRecord {
    /// The kind tag of this record.
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorRecord::Temperature { .. } => SensorKind::Temperature,
            SensorRecord::Light { .. } => SensorKind::Light,
            SensorRecord::Humidity { .. } => SensorKind::Humidity,
            SensorRecord::MessageStats(_) => SensorKind::MessageStats,
            SensorRecord::ConfigSettings { .. } => SensorKind::ConfigSettings,
            SensorRecord::Pressure { .. } => SensorKind::Pressure,
            SensorRecord::Motion { .. } => SensorKind::Motion,
            SensorRecord::BatteryVoltage { .. } => SensorKind::BatteryVoltage,
            SensorRecord::HallEffect { .. } => SensorKind::HallEffect,
            SensorRecord::Fan { .. } => SensorKind::Fan,
            SensorRecord::DoorLock { .. } => SensorKind::DoorLock,
            SensorRecord::WaterLeak { .. } => SensorKind::WaterLeak,
        }
    }

    /// A zero-valued record of `kind`, used when a config response advertises
    /// a kind the device has not reported yet.
    pub fn zeroed(kind: SensorKind) -> Self {
        match kind {
            SensorKind::Temperature => SensorRecord::Temperature {
                ambience: 0,
                object: 0,
            },
            SensorKind::Light => SensorRecord::Light { raw: 0 },
            SensorKind::Humidity => SensorRecord::Humidity {
                temp: 0,
                humidity: 0,
            },
            SensorKind::MessageStats => SensorRecord::MessageStats(MessageStats::default()),
            SensorKind::ConfigSettings => SensorRecord::ConfigSettings {
                reporting_ms: 0,
                polling_ms: 0,
            },
            SensorKind::Pressure => SensorRecord::Pressure {
                temp: 0,
                pressure: 0,
            },
            SensorKind::Motion => SensorRecord::Motion { detected: false },
            SensorKind::BatteryVoltage => SensorRecord::BatteryVoltage { millivolts: 0 },
            SensorKind::HallEffect => SensorRecord::HallEffect {
                open: false,
                tampered: false,
            },
            SensorKind::Fan => SensorRecord::Fan { speed: 0 },
            SensorKind::DoorLock => SensorRecord::DoorLock { locked: false },
            SensorKind::WaterLeak => SensorRecord::WaterLeak { status: 0 },
        }
    }
}

/// Decoded sensor telemetry indication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDataInd {
    /// Sender address as selected by the wire address mode.
    pub source: DeviceAddr,
    /// Received signal strength, signed.
    pub rssi: i8,
    /// The reporting device's 64-bit address, as carried in the payload.
    pub device_ext_addr: u64,
    /// Frame-control mask; the authoritative schema for this message.
    pub frame_control: u16,
    /// One record per set bit, in ascending bit order.
    pub records: Vec<SensorRecord>,
}

/// Decoded device config response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigRsp {
    /// Sender address as selected by the wire address mode.
    pub source: DeviceAddr,
    /// Received signal strength, signed.
    pub rssi: i8,
    /// Zero on success.
    pub status: u16,
    /// Kinds the device will report.
    pub frame_control: u16,
    /// Accepted reporting interval in milliseconds.
    pub reporting_ms: u32,
    /// Accepted polling interval in milliseconds.
    pub polling_ms: u32,
}

/// Contents of a `DEVICE_DATA_RX_IND` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRxInd {
    /// Bitmask-gated telemetry.
    SensorData(SensorDataInd),
    /// Fixed-shape config response.
    ConfigResponse(ConfigRsp),
    /// A sub-command this side does not process; no further bytes consumed.
    Unrecognized {
        /// Sender address.
        source: DeviceAddr,
        /// Received signal strength, signed.
        rssi: i8,
        /// The unprocessed sub-command id.
        sub_cmd: u8,
    },
}

/// Every inbound message the link dispatches.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// A device joined; creates or updates a registry record.
    DeviceJoined(DeviceDescriptor),
    /// Unsolicited network descriptor update.
    NetworkInfoUpdate(NetworkDescriptor),
    /// Reply to a network-info request. When `status` is not
    /// [`NWK_INFO_STARTED`], `info` is informational only and the network
    /// state must not be touched.
    NetworkInfoCnf {
        /// `1` when the network is started.
        status: u8,
        /// Descriptor fields as carried on the wire.
        info: NetworkDescriptor,
    },
    /// Full device array; replaces the registry's contents outright.
    DeviceArray {
        /// Confirmation status byte.
        status: u8,
        /// The authoritative device list, in wire order.
        devices: Vec<DeviceDescriptor>,
    },
    /// A device stopped responding.
    DeviceInactive {
        /// PAN the device belongs to.
        pan_id: u16,
        /// Short address at inactivity time.
        short_addr: u16,
        /// Stable 64-bit identity.
        ext_addr: u64,
        /// Inactivity timeout count.
        timeout: u8,
    },
    /// Telemetry or config response from a device.
    DataRx(DataRxInd),
    /// Coordinator state changed.
    StateChange(CoordState),
    /// Join-permit confirmation; zero status means success.
    JoinPermitCnf {
        /// Confirmation status; `0` on success.
        status: u32,
    },
    /// Transmit-data confirmation; acknowledged without decoding.
    TxDataCnf,
    /// A remove request completed; the registry must be refreshed via a full
    /// device-array request, since the response names no record.
    RemoveDeviceRsp,
}

/// `GET_NWK_INFO_CNF` status value meaning the network is up.
pub const NWK_INFO_STARTED: u8 = 1;
