use crate::error::{NodeError, NodeResult};
use crate::flow::FlowConfig;
use crate::network_config::{ServerConfig, WifiConfig};
use serde::{Deserialize, Serialize};

/// Everything the node needs at boot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub wifi: WifiConfig,
    pub flow: FlowConfig,
    pub server: ServerConfig,
}

impl NodeConfig {
    /// Defaults with WiFi credentials from the build environment.
    pub fn from_build_env() -> NodeResult<Self> {
        let config = Self {
            wifi: WifiConfig::from_build_env()?,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> NodeResult<()> {
        if self.wifi.ssid.is_empty() {
            return Err(NodeError::Config("WiFi SSID cannot be empty".into()));
        }
        let factor = self.flow.calibration_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(NodeError::Config(format!(
                "calibration factor must be positive, got {}",
                factor
            )));
        }
        if self.flow.sample_window_ms == 0 {
            return Err(NodeError::Config("sample window must be non-zero".into()));
        }
        if self.server.connect_attempts == 0 {
            return Err(NodeError::Config("connect attempts must be non-zero".into()));
        }
        if self.server.max_request_bytes == 0 {
            return Err(NodeError::Config("request budget must be non-zero".into()));
        }
        if self.server.read_timeout_ms == Some(0) {
            return Err(NodeError::Config(
                "read timeout of 0ms; use None to disable".into(),
            ));
        }
        Ok(())
    }
}
