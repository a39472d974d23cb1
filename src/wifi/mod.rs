//! WiFi association and reconnection.
//!
//! The radio is reached through [`Radio`]; the ESP-IDF implementation lives in
//! [`esp::EspRadio`], everything here runs on the host as well.

#[cfg(target_os = "espidf")]
pub mod esp;

#[cfg(target_os = "espidf")]
pub use esp::EspRadio;

use crate::error::{NodeError, NodeResult};
use crate::network_config::{ServerConfig, WifiConfig};
use embedded_hal::blocking::delay::DelayMs;
use log::info;
use std::net::Ipv4Addr;

/// Station link status as reported by the radio driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// Radio not started or no association requested.
    Idle,
    /// Association in progress.
    Connecting,
    /// Associated, waiting for a DHCP lease.
    WaitingForIp,
    /// Associated with an address assigned.
    GotIp,
    /// Association rejected (bad password, AP gone).
    Failed,
}

impl LinkStatus {
    pub fn is_associated(self) -> bool {
        matches!(self, LinkStatus::WaitingForIp | LinkStatus::GotIp)
    }

    /// Either outcome is final for one connect attempt
    pub fn is_settled(self) -> bool {
        matches!(self, LinkStatus::GotIp | LinkStatus::Failed)
    }
}

/// Station-mode radio: connect/disconnect/status/ifconfig.
pub trait Radio {
    /// Bring the interface up in station mode; no-op when already started.
    fn activate(&mut self) -> anyhow::Result<()>;

    /// Start associating. Must not block until the link is up.
    fn begin_connect(&mut self, ssid: &str, password: &str) -> anyhow::Result<()>;

    fn disconnect(&mut self) -> anyhow::Result<()>;

    fn link_status(&self) -> LinkStatus;

    fn ip_address(&self) -> Option<Ipv4Addr>;
}

/// Anything that can answer "is the network usable right now".
pub trait Connectivity {
    fn is_connected(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectivityState {
    pub is_associated: bool,
    pub address: Option<Ipv4Addr>,
}

pub struct NetworkSession<R, D> {
    radio: R,
    delay: D,
    state: ConnectivityState,
    poll_ms: u32,
    radio_reset_ms: u32,
}

impl<R, D> NetworkSession<R, D>
where
    R: Radio,
    D: DelayMs<u32>,
{
    pub fn new(radio: R, delay: D, server: &ServerConfig) -> Self {
        Self {
            radio,
            delay,
            state: ConnectivityState::default(),
            poll_ms: server.connect_poll_ms,
            radio_reset_ms: server.radio_reset_ms,
        }
    }

    /// Associate and wait for an address, polling at most `attempts` times.
    ///
    /// An existing association is dropped first so a stale link never races the
    /// new one.
    pub fn connect(&mut self, wifi: &WifiConfig, attempts: u32) -> NodeResult<ConnectivityState> {
        self.radio.activate().map_err(connection_error)?;

        if self.radio.link_status().is_associated() {
            info!("🔌 WiFi: Dropping existing association...");
            self.radio.disconnect().map_err(connection_error)?;
            self.delay.delay_ms(self.radio_reset_ms);
        }

        info!("🌐 WiFi: Connecting to '{}'...", wifi.ssid);
        self.radio
            .begin_connect(wifi.ssid.as_str(), wifi.password.as_str())
            .map_err(connection_error)?;

        let mut remaining = attempts;
        while remaining > 0 {
            if self.radio.link_status().is_settled() {
                break;
            }
            remaining -= 1;
            info!("WiFi: Waiting for connection...");
            self.delay.delay_ms(self.poll_ms);
        }

        let status = self.radio.link_status();
        if status != LinkStatus::GotIp {
            self.state = ConnectivityState {
                is_associated: status.is_associated(),
                address: None,
            };
            return Err(NodeError::Connection(format!(
                "'{}' not ready after {} attempts ({:?})",
                wifi.ssid, attempts, status
            )));
        }

        self.state = ConnectivityState {
            is_associated: true,
            address: self.radio.ip_address(),
        };
        match self.state.address {
            Some(ip) => info!("✅ WiFi: Connected, IP address: {}", ip),
            None => info!("✅ WiFi: Connected"),
        }
        Ok(self.state)
    }

    /// Cheap status poll, safe to call before every accept.
    pub fn is_connected(&self) -> bool {
        self.radio.link_status() == LinkStatus::GotIp
    }

    /// Connectivity check that also updates [`state`](Self::state).
    pub fn refresh(&mut self) -> bool {
        let status = self.radio.link_status();
        let connected = status == LinkStatus::GotIp;
        self.state = ConnectivityState {
            is_associated: status.is_associated(),
            address: if connected { self.radio.ip_address() } else { None },
        };
        connected
    }

    /// State as of the last `connect` or `refresh`.
    pub fn state(&self) -> ConnectivityState {
        self.state
    }
}

impl<R, D> Connectivity for NetworkSession<R, D>
where
    R: Radio,
    D: DelayMs<u32>,
{
    fn is_connected(&self) -> bool {
        NetworkSession::is_connected(self)
    }
}

fn connection_error(e: anyhow::Error) -> NodeError {
    NodeError::Connection(e.to_string())
}
