//! Connection supervisor task.
//!
//! Owns the TCP stream, the device registry, and the current network
//! descriptor. Runs a single event loop multiplexing collector frames with
//! application commands, and cycles through reconnect attempts at a fixed
//! delay whenever the stream fails.

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tokio_util::codec::Framed;
use tracing::{debug, info, trace, warn};

use crate::config::{CollectorConfig, LinkConfig};
use crate::core::{Frame, FrameCodec};
use crate::error::Result;
use crate::link::handle::{Command, DeviceCommand, LinkHandle};
use crate::link::{LinkEvent, LinkState};
use crate::nwk::NetworkDescriptor;
use crate::protocol::message::{DataRxInd, Incoming, NWK_INFO_STARTED};
use crate::protocol::{decode_frame, encode};
use crate::registry::{DeviceAddr, DeviceRecord, DeviceRegistry};

type CollectorStream = Framed<TcpStream, FrameCodec>;

/// Why a connected session ended.
enum SessionEnd {
    /// Shutdown was requested; do not reconnect.
    Shutdown,
    /// The stream failed or closed; reconnect after the configured delay.
    Lost,
}

/// Entry point for running a link.
pub struct CollectorLink;

impl CollectorLink {
    /// Validate `config`, spawn the supervisor task, and return the handle
    /// together with the task's join handle.
    ///
    /// The supervisor connects in the background; observe readiness through
    /// [`LinkHandle::watch_state`] or by subscribing to events.
    pub fn spawn(config: LinkConfig) -> Result<(LinkHandle, JoinHandle<()>)> {
        config.validate_strict()?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(LinkState::Disconnected);
        let (events, _) = broadcast::channel(config.collector.event_capacity);

        let handle = LinkHandle::new(cmd_tx, state_rx, events.clone());
        let supervisor = Supervisor {
            config: config.collector,
            cmd_rx,
            state_tx,
            events,
            registry: DeviceRegistry::new(),
            network: None,
        };

        let task = tokio::spawn(supervisor.run());
        Ok((handle, task))
    }
}

struct Supervisor {
    config: CollectorConfig,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<LinkState>,
    events: broadcast::Sender<LinkEvent>,
    registry: DeviceRegistry,
    network: Option<NetworkDescriptor>,
}

impl Supervisor {
    async fn run(mut self) {
        info!(address = %self.config.address, "collector link starting");
        self.set_state(LinkState::Connecting);

        loop {
            let attempt = timeout(
                self.config.connect_timeout,
                TcpStream::connect(&self.config.address),
            )
            .await;

            let stream = match attempt {
                Ok(Ok(stream)) => stream,
                Ok(Err(err)) => {
                    warn!(error = %err, address = %self.config.address,
                        "connection to collector failed");
                    if self.wait_reconnect().await {
                        break;
                    }
                    continue;
                }
                Err(_) => {
                    warn!(timeout = ?self.config.connect_timeout,
                        "connection attempt timed out");
                    if self.wait_reconnect().await {
                        break;
                    }
                    continue;
                }
            };

            info!(address = %self.config.address, "connected to collector");
            let mut framed = Framed::new(stream, FrameCodec);

            // Bootstrap: ask for the network descriptor first; a successful
            // confirmation triggers the device-array request.
            if let Err(err) = framed.send(encode::get_network_info_req()).await {
                warn!(error = %err, "bootstrap request failed");
                if self.wait_reconnect().await {
                    break;
                }
                continue;
            }

            self.set_state(LinkState::Connected);
            match self.connected(&mut framed).await {
                SessionEnd::Shutdown => break,
                SessionEnd::Lost => {
                    if self.wait_reconnect().await {
                        break;
                    }
                }
            }
        }

        self.set_state(LinkState::Disconnected);
        info!("collector link stopped");
    }

    /// Event loop for a live connection.
    async fn connected(&mut self, framed: &mut CollectorStream) -> SessionEnd {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    let Some(cmd) = cmd else {
                        debug!("all handles dropped, shutting down");
                        return SessionEnd::Shutdown;
                    };
                    if matches!(cmd, Command::Shutdown) {
                        info!("shutdown requested");
                        return SessionEnd::Shutdown;
                    }
                    if let Err(err) = self.handle_command(framed, cmd).await {
                        warn!(error = %err, "send to collector failed");
                        return SessionEnd::Lost;
                    }
                }
                frame = framed.next() => {
                    match frame {
                        Some(Ok(frame)) => {
                            if let Err(err) = self.handle_frame(framed, frame).await {
                                warn!(error = %err, "session failed");
                                return SessionEnd::Lost;
                            }
                        }
                        Some(Err(err)) => {
                            warn!(error = %err, "read from collector failed");
                            return SessionEnd::Lost;
                        }
                        None => {
                            info!("collector closed the connection");
                            return SessionEnd::Lost;
                        }
                    }
                }
            }
        }
    }

    /// Wait out the reconnect delay, still honoring shutdown. Returns `true`
    /// when the supervisor should stop instead of reconnecting.
    async fn wait_reconnect(&mut self) -> bool {
        self.set_state(LinkState::Reconnecting);
        debug!(delay = ?self.config.reconnect_delay, "waiting before reconnect");

        let delay = sleep(self.config.reconnect_delay);
        tokio::pin!(delay);
        loop {
            tokio::select! {
                _ = &mut delay => return false,
                cmd = self.cmd_rx.recv() => match cmd {
                    None | Some(Command::Shutdown) => return true,
                    Some(cmd) => {
                        // The handle already fails these synchronously; this
                        // only catches commands racing a disconnect.
                        warn!(?cmd, "dropping command while link is down");
                    }
                },
            }
        }
    }

    /// Translate one application command into an outbound frame. An `Err`
    /// here is a stream failure.
    async fn handle_command(
        &mut self,
        framed: &mut CollectorStream,
        cmd: Command,
    ) -> Result<()> {
        let frame = match cmd {
            Command::GetNetworkInfo => encode::get_network_info_req(),
            Command::SetJoinPermit { open } => {
                info!(open, "setting join permit");
                encode::set_join_permit_req(open)
            }
            Command::Device { addr, command } => {
                let Some(short) = self.resolve_short(addr) else {
                    return Ok(());
                };
                match command {
                    DeviceCommand::Config {
                        polling_interval,
                        reporting_interval,
                        frame_control,
                    } => {
                        debug!(%addr, polling_interval, reporting_interval,
                            frame_control = format_args!("{frame_control:#06x}"),
                            "sending config request");
                        encode::tx_config_req(
                            short,
                            polling_interval,
                            reporting_interval,
                            frame_control,
                        )
                    }
                    DeviceCommand::Toggle => {
                        debug!(%addr, "sending toggle request");
                        encode::tx_toggle_req(short)
                    }
                    DeviceCommand::Buzzer => {
                        debug!(%addr, "sending buzzer request");
                        encode::tx_buzzer_req(short)
                    }
                }
            }
            Command::RemoveDevice { addr } => {
                let Some(short) = self.resolve_short(addr) else {
                    return Ok(());
                };
                info!(%addr, "requesting device removal");
                encode::remove_device_req(short)
            }
            Command::DeviceMoved { addr } => {
                let Some(short) = self.resolve_short(addr) else {
                    return Ok(());
                };
                debug!(%addr, "reporting device moved");
                encode::device_moved_ind(short)
            }
            // Handled by the caller before dispatch.
            Command::Shutdown => return Ok(()),
        };

        framed.send(frame).await
    }

    /// Decode and dispatch one inbound frame. Malformed and unprocessed
    /// frames are dropped here; an `Err` is a stream failure from a
    /// follow-up send.
    async fn handle_frame(&mut self, framed: &mut CollectorStream, frame: Frame) -> Result<()> {
        let incoming = match decode_frame(&frame) {
            Ok(incoming) => incoming,
            Err(crate::error::LinkError::UnknownCommand(cmd)) => {
                debug!(cmd, "ignoring unprocessed command");
                return Ok(());
            }
            Err(err) => {
                warn!(error = %err, "dropping malformed frame");
                return Ok(());
            }
        };

        match incoming {
            Incoming::DeviceJoined(desc) => {
                info!(short_addr = format_args!("0x{:04x}", desc.short_addr),
                    ext_addr = format_args!("0x{:016x}", desc.ext_addr),
                    "device joined");
                let index = self.registry.upsert(DeviceRecord::from(desc));
                let record = self.registry.get(index).cloned();
                if let Some(record) = record {
                    self.notify(LinkEvent::DeviceUpdated(record));
                }
                if let Some(net) = &self.network {
                    let snapshot = net.clone();
                    self.notify(LinkEvent::NetworkInfoChanged(snapshot));
                }
            }
            Incoming::NetworkInfoUpdate(info) => {
                debug!(state = ?info.state, "network info update");
                let snapshot = match self.network.as_mut() {
                    Some(net) => {
                        net.merge_update(&info);
                        net.clone()
                    }
                    None => {
                        self.network = Some(info.clone());
                        info
                    }
                };
                self.notify(LinkEvent::NetworkInfoChanged(snapshot));
            }
            Incoming::NetworkInfoCnf { status, info } => {
                if status == NWK_INFO_STARTED {
                    info!(pan_id = format_args!("0x{:04x}", info.pan_id),
                        channel = info.channel, "network started");
                    self.network = Some(info.clone());
                    self.notify(LinkEvent::NetworkInfoChanged(info));
                    framed.send(encode::get_device_array_req()).await?;
                } else {
                    warn!(status, "collector network not started");
                }
            }
            Incoming::DeviceArray { status, devices } => {
                debug!(status, count = devices.len(), "device array received");
                self.registry
                    .replace_all(devices.into_iter().map(DeviceRecord::from).collect());
                self.notify(LinkEvent::DeviceArrayReplaced(self.registry.snapshot()));
            }
            Incoming::DeviceInactive {
                short_addr,
                ext_addr,
                timeout,
                ..
            } => {
                // The extended address is the stable identity; fall back to
                // the short address for records that predate it.
                let addr = if self.registry.find(DeviceAddr::Extended(ext_addr)).is_some() {
                    DeviceAddr::Extended(ext_addr)
                } else {
                    DeviceAddr::Short(short_addr)
                };
                match self.registry.mark_inactive(addr) {
                    Some(record) => {
                        info!(%addr, timeout, "device inactive");
                        let record = record.clone();
                        self.notify(LinkEvent::DeviceUpdated(record));
                    }
                    None => {
                        warn!(%addr, "inactive indication for unknown device");
                    }
                }
            }
            Incoming::DataRx(DataRxInd::SensorData(ind)) => {
                let addr = if self.registry.find(ind.source).is_some() {
                    ind.source
                } else {
                    DeviceAddr::Extended(ind.device_ext_addr)
                };
                match self.registry.get_mut_by_addr(addr) {
                    Some(record) => {
                        record.apply_sensor_data(&ind);
                        let record = record.clone();
                        trace!(%addr, frame_control = format_args!("{:#06x}", ind.frame_control),
                            "sensor data applied");
                        self.notify(LinkEvent::DeviceUpdated(record));
                    }
                    None => {
                        warn!(source = %ind.source, "telemetry from unknown device");
                    }
                }
            }
            Incoming::DataRx(DataRxInd::ConfigResponse(rsp)) => {
                match self.registry.get_mut_by_addr(rsp.source) {
                    Some(record) => {
                        record.apply_config_rsp(&rsp);
                        let record = record.clone();
                        debug!(source = %rsp.source, status = rsp.status,
                            "config response applied");
                        self.notify(LinkEvent::DeviceUpdated(record));
                    }
                    None => {
                        warn!(source = %rsp.source, "config response from unknown device");
                    }
                }
            }
            Incoming::DataRx(DataRxInd::Unrecognized { source, rssi, sub_cmd }) => {
                debug!(%source, rssi, sub_cmd, "unrecognized device sub-command");
            }
            Incoming::StateChange(state) => {
                debug!(?state, "coordinator state change");
                if let Some(net) = self.network.as_mut() {
                    net.set_state(state);
                    let snapshot = net.clone();
                    self.notify(LinkEvent::NetworkInfoChanged(snapshot));
                }
            }
            Incoming::JoinPermitCnf { status } => {
                if status != 0 {
                    warn!(status, "join permit request failed");
                }
                self.notify(LinkEvent::JoinPermitConfirmed(status));
            }
            Incoming::TxDataCnf => {
                trace!("transmit confirmed");
            }
            Incoming::RemoveDeviceRsp => {
                // The response names no record; refresh the whole array.
                debug!("device removed, refreshing device array");
                framed.send(encode::get_device_array_req()).await?;
            }
        }

        Ok(())
    }

    fn resolve_short(&self, addr: DeviceAddr) -> Option<u16> {
        match self.registry.get_by_addr(addr) {
            Some(record) => Some(record.short_addr),
            None => {
                warn!(%addr, "dropping command for device not in registry");
                None
            }
        }
    }

    fn notify(&self, event: LinkEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn set_state(&self, state: LinkState) {
        let _ = self.state_tx.send(state);
    }
}
