use crate::error::{NodeError, NodeResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

/// Listener, client and reconnect tuning for the supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port of the HTTP service
    pub port: u16,

    /// Receive budget for one request (single read)
    pub max_request_bytes: usize,

    /// Read timeout on accepted connections; `None` blocks until the client sends
    pub read_timeout_ms: Option<u64>,

    /// Status polls before an association attempt is abandoned
    pub connect_attempts: u32,

    /// Pause between status polls (ms)
    pub connect_poll_ms: u32,

    /// Pause after dropping a stale association so the radio can reset (ms)
    pub radio_reset_ms: u32,

    /// Pause before the supervisor restarts after a failure (ms)
    pub retry_backoff_ms: u32,
}

impl WifiConfig {
    pub fn new(ssid: &str, password: &str) -> NodeResult<Self> {
        let mut ssid_str = heapless::String::<32>::new();
        ssid_str
            .push_str(ssid)
            .map_err(|_| NodeError::Config("SSID too long (max 32 chars)".into()))?;

        let mut password_str = heapless::String::<64>::new();
        password_str
            .push_str(password)
            .map_err(|_| NodeError::Config("Password too long (max 64 chars)".into()))?;

        Ok(Self {
            ssid: ssid_str,
            password: password_str,
        })
    }

    /// Credentials baked in at build time through `FLOW_NODE_WIFI_SSID` and
    /// `FLOW_NODE_WIFI_PASSWORD`.
    pub fn from_build_env() -> NodeResult<Self> {
        match option_env!("FLOW_NODE_WIFI_SSID") {
            Some(ssid) => Self::new(ssid, option_env!("FLOW_NODE_WIFI_PASSWORD").unwrap_or("")),
            None => Ok(Self::default()),
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for WifiConfig {
    fn default() -> Self {
        let mut ssid = heapless::String::new();
        let mut password = heapless::String::new();
        let _ = ssid.push_str("YOUR_SSID");
        let _ = password.push_str("YOUR_PASSWORD");

        Self { ssid, password }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 80,
            max_request_bytes: 1024,
            read_timeout_ms: Some(5000),
            connect_attempts: 10,
            connect_poll_ms: 1000,
            radio_reset_ms: 1000,
            retry_backoff_ms: 5000,
        }
    }
}
