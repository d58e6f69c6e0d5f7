//! # Device Registry
//!
//! Insertion-ordered collection of known devices, keyed by hardware address.
//!
//! The 64-bit extended address is the stable identity; the 16-bit short
//! address is network-assigned and may be reassigned, so short-address
//! matches are only trusted transiently. The registry never holds two
//! records with the same extended address.
//!
//! All operations are synchronous and run on the supervisor task, which is
//! the registry's single writer; no locking is needed. Consumers only ever
//! see cloned snapshots delivered through notifications.

use std::collections::BTreeMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::protocol::message::{
    CapabilityInfo, ConfigRsp, DeviceDescriptor, SensorDataInd, SensorKind, SensorRecord,
};

/// A device address in either of the protocol's two widths.
///
/// Extended addresses exist only as `u64` here; normalizing at the type level
/// removes the string/number comparison mismatches that made short-address
/// lookups collide in mixed representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceAddr {
    /// 16-bit network-assigned address.
    Short(u16),
    /// 64-bit globally unique address.
    Extended(u64),
}

impl fmt::Display for DeviceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceAddr::Short(addr) => write!(f, "short 0x{addr:04X}"),
            DeviceAddr::Extended(addr) => write!(f, "ext 0x{addr:016X}"),
        }
    }
}

impl From<u16> for DeviceAddr {
    fn from(addr: u16) -> Self {
        DeviceAddr::Short(addr)
    }
}

impl From<u64> for DeviceAddr {
    fn from(addr: u64) -> Self {
        DeviceAddr::Extended(addr)
    }
}

/// Polling interval as presented to consumers. Devices whose receiver idles
/// poll on a timer; always-on devices have no meaningful polling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollingInterval {
    /// Poll period in milliseconds.
    Millis(u32),
    /// Receiver always on; the device does not poll.
    AlwaysOn,
}

/// Everything the link knows about one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Network-assigned 16-bit address.
    pub short_addr: u16,
    /// Stable 64-bit identity.
    pub ext_addr: u64,
    /// Capability flags from the join or array message.
    pub capability: CapabilityInfo,
    /// False once an inactivity indication arrives, true again on traffic.
    pub active: bool,
    /// Signal strength of the last received message.
    pub rssi: Option<i8>,
    /// When the last telemetry arrived.
    pub last_report: Option<SystemTime>,
    /// Reporting interval accepted by the device, milliseconds.
    pub reporting_interval_ms: Option<u32>,
    /// Polling interval, when known.
    pub polling_interval: Option<PollingInterval>,
    /// Latest value per sensor kind the device has reported.
    pub sensors: BTreeMap<SensorKind, SensorRecord>,
}

impl DeviceRecord {
    /// Fresh record for a newly seen device.
    pub fn new(short_addr: u16, ext_addr: u64, capability: CapabilityInfo) -> Self {
        DeviceRecord {
            short_addr,
            ext_addr,
            capability,
            active: true,
            rssi: None,
            last_report: None,
            reporting_interval_ms: None,
            polling_interval: None,
            sensors: BTreeMap::new(),
        }
    }

    /// Fold a telemetry indication into the record. The message's
    /// frame-control set is authoritative for what gets updated; kinds absent
    /// from it keep their previous values.
    pub fn apply_sensor_data(&mut self, ind: &SensorDataInd) {
        self.active = true;
        for record in &ind.records {
            self.sensors.insert(record.kind(), *record);
        }
        self.rssi = Some(ind.rssi);
        self.last_report = Some(SystemTime::now());
    }

    /// Fold a successful config response into the record. Kinds advertised
    /// by the response that have not reported yet get a zeroed placeholder.
    pub fn apply_config_rsp(&mut self, rsp: &ConfigRsp) {
        if rsp.status != 0 {
            return;
        }
        self.active = true;
        for kind in SensorKind::ALL {
            if rsp.frame_control & kind.bit() != 0 {
                self.sensors
                    .entry(kind)
                    .or_insert_with(|| SensorRecord::zeroed(kind));
            }
        }
        self.reporting_interval_ms = Some(rsp.reporting_ms);
        self.polling_interval = Some(if self.capability.rx_on_when_idle {
            PollingInterval::Millis(rsp.polling_ms)
        } else {
            PollingInterval::AlwaysOn
        });
        self.rssi = Some(rsp.rssi);
    }

    /// Does `addr` refer to this record?
    fn matches(&self, addr: DeviceAddr) -> bool {
        match addr {
            DeviceAddr::Short(short) => self.short_addr == short,
            DeviceAddr::Extended(ext) => self.ext_addr == ext,
        }
    }
}

impl From<DeviceDescriptor> for DeviceRecord {
    fn from(desc: DeviceDescriptor) -> Self {
        DeviceRecord::new(desc.short_addr, desc.ext_addr, desc.capability)
    }
}

/// Ordered collection of device records.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<DeviceRecord>,
}

impl DeviceRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        DeviceRegistry::default()
    }

    /// Number of known devices.
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// True when no devices are known.
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Index of the record `addr` refers to.
    ///
    /// Short addresses compare against the network-assigned field, extended
    /// addresses against the stable identity; an extended lookup can never
    /// spuriously match a colliding short address.
    pub fn find(&self, addr: DeviceAddr) -> Option<usize> {
        self.devices.iter().position(|dev| dev.matches(addr))
    }

    /// Shared access by index, in insertion order.
    pub fn get(&self, index: usize) -> Option<&DeviceRecord> {
        self.devices.get(index)
    }

    /// Shared access by address.
    pub fn get_by_addr(&self, addr: DeviceAddr) -> Option<&DeviceRecord> {
        self.find(addr).map(|index| &self.devices[index])
    }

    /// Exclusive access by address.
    pub fn get_mut_by_addr(&mut self, addr: DeviceAddr) -> Option<&mut DeviceRecord> {
        let index = self.find(addr)?;
        Some(&mut self.devices[index])
    }

    /// Insert `record`, or update in place if a record with the same
    /// extended address already exists (the short address may have been
    /// reassigned in between). Returns the index of the stored record.
    pub fn upsert(&mut self, record: DeviceRecord) -> usize {
        match self.find(DeviceAddr::Extended(record.ext_addr)) {
            Some(index) => {
                let existing = &mut self.devices[index];
                existing.short_addr = record.short_addr;
                existing.capability = record.capability;
                existing.active = true;
                index
            }
            None => {
                self.devices.push(record);
                self.devices.len() - 1
            }
        }
    }

    /// Flag the record `addr` refers to as inactive.
    pub fn mark_inactive(&mut self, addr: DeviceAddr) -> Option<&DeviceRecord> {
        let index = self.find(addr)?;
        self.devices[index].active = false;
        Some(&self.devices[index])
    }

    /// Discard the current contents and adopt `records` as the authoritative
    /// list, preserving their order. Used only by the full-array
    /// confirmation. Duplicate extended addresses collapse to the first
    /// occurrence.
    pub fn replace_all(&mut self, records: Vec<DeviceRecord>) {
        self.devices.clear();
        for record in records {
            self.upsert(record);
        }
    }

    /// Remove and return the record `addr` refers to.
    pub fn remove(&mut self, addr: DeviceAddr) -> Option<DeviceRecord> {
        let index = self.find(addr)?;
        Some(self.devices.remove(index))
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.iter()
    }

    /// Owned copy of every record, for notification payloads.
    pub fn snapshot(&self) -> Vec<DeviceRecord> {
        self.devices.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(short: u16, ext: u64) -> DeviceRecord {
        DeviceRecord::new(short, ext, CapabilityInfo::default())
    }

    #[test]
    fn find_by_short_and_extended() {
        let mut reg = DeviceRegistry::new();
        reg.upsert(record(0x1234, 0xAABB));
        reg.upsert(record(0x5678, 0xCCDD));

        assert_eq!(reg.find(DeviceAddr::Short(0x5678)), Some(1));
        assert_eq!(reg.find(DeviceAddr::Extended(0xAABB)), Some(0));
        assert_eq!(reg.find(DeviceAddr::Short(0x9999)), None);
    }

    #[test]
    fn extended_lookup_ignores_short_collisions() {
        let mut reg = DeviceRegistry::new();
        // A short address numerically equal to another device's truncated
        // extended address must not satisfy an extended lookup.
        reg.upsert(record(0xAABB, 0x0001_0000_0000_AABB));
        assert_eq!(reg.find(DeviceAddr::Extended(0xAABB)), None);
        assert_eq!(reg.find(DeviceAddr::Short(0xAABB)), Some(0));
    }

    #[test]
    fn upsert_collapses_duplicate_extended_address() {
        let mut reg = DeviceRegistry::new();
        reg.upsert(record(0x1111, 0xAABB));
        // Same device rejoined with a reassigned short address.
        let index = reg.upsert(record(0x2222, 0xAABB));
        assert_eq!(index, 0);
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(0).unwrap().short_addr, 0x2222);
    }

    #[test]
    fn replace_all_with_empty_clears() {
        let mut reg = DeviceRegistry::new();
        reg.upsert(record(1, 10));
        reg.upsert(record(2, 20));
        reg.replace_all(Vec::new());
        assert!(reg.is_empty());
    }

    #[test]
    fn mark_inactive_touches_only_the_target() {
        let mut reg = DeviceRegistry::new();
        reg.upsert(record(0x1234, 0xAABB));
        reg.upsert(record(0x5678, 0xCCDD));

        reg.mark_inactive(DeviceAddr::Short(0x1234)).unwrap();
        assert!(!reg.get(0).unwrap().active);
        assert!(reg.get(1).unwrap().active);
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut reg = DeviceRegistry::new();
        reg.upsert(record(1, 10));
        reg.upsert(record(2, 20));
        reg.upsert(record(3, 30));

        let removed = reg.remove(DeviceAddr::Extended(20)).unwrap();
        assert_eq!(removed.short_addr, 2);
        let shorts: Vec<u16> = reg.iter().map(|d| d.short_addr).collect();
        assert_eq!(shorts, vec![1, 3]);
    }
}
