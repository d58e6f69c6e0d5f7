//! # Collector Link
//!
//! Client-side link to a wireless sensor-network collector over TCP.
//!
//! The collector fronts a low-power wireless network of battery and mains
//! powered sensor devices. This crate maintains a supervised connection to
//! it: length-prefixed binary framing, typed decoding of every indication
//! and confirmation the collector emits, an in-memory registry mirroring the
//! collector's device list, and a command surface for configuring and
//! actuating individual devices.
//!
//! ## Components
//! - [`core`]: wire framing and the tokio codec
//! - [`protocol`]: command ids, payload decoders, and request encoders
//! - [`registry`]: device records and the address-indexed registry
//! - [`nwk`]: network descriptor and coordinator state
//! - [`link`]: the supervised connection and its handle
//! - [`config`]: TOML/environment configuration
//!
//! ## Quick Start
//!
//! ```no_run
//! use collector_link::{CollectorLink, LinkConfig, LinkEvent};
//!
//! # async fn run() -> collector_link::Result<()> {
//! let config = LinkConfig::default();
//! let (handle, task) = CollectorLink::spawn(config)?;
//!
//! let mut events = handle.subscribe();
//! while let Ok(event) = events.recv().await {
//!     match event {
//!         LinkEvent::NetworkInfoChanged(info) => {
//!             println!("network 0x{:04x} state {:?}", info.pan_id, info.state);
//!         }
//!         LinkEvent::DeviceUpdated(device) => {
//!             println!("device 0x{:04x} updated", device.short_addr);
//!         }
//!         _ => {}
//!     }
//! }
//!
//! handle.shutdown()?;
//! task.await.ok();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod link;
pub mod nwk;
pub mod protocol;
pub mod registry;
pub mod utils;

pub use crate::core::{Frame, FrameCodec};
pub use config::{CollectorConfig, LinkConfig, LoggingConfig};
pub use error::{LinkError, Result};
pub use link::{CollectorLink, DeviceCommand, LinkEvent, LinkHandle, LinkState};
pub use nwk::{CoordState, NetworkDescriptor};
pub use protocol::{decode_frame, Incoming};
pub use registry::{DeviceAddr, DeviceRecord, DeviceRegistry, PollingInterval};
