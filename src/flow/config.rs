use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Sensor pulses per litre
    pub calibration_factor: f64,

    /// Sampling window for one reading (ms)
    pub sample_window_ms: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            calibration_factor: 7.5, // YF-S201 style hall sensor
            sample_window_ms: 1000,
        }
    }
}
