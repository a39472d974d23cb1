//! ESP32 Flow Monitor and Relay Controller Library
//!
//! Counts flow sensor pulses from a GPIO interrupt, turns them into a flow rate and
//! serves that rate, plus control of a relay, over a one-request-per-connection
//! HTTP interface. The relay is forced off whenever a reading shows no flow.
//!
//! Hardware-facing pieces are compiled for `target_os = "espidf"` only; the rest
//! runs and is tested on the host.

pub mod config;
pub mod error;
pub mod flow;
pub mod http;
pub mod network_config;
pub mod relay;
pub mod supervisor;
pub mod wifi;

#[cfg(test)]
mod test_support;

pub use config::NodeConfig;
pub use error::{NodeError, NodeResult};
pub use flow::{Clock, FlowConfig, FlowEstimator, FlowReading, MonotonicClock, PulseCounter};
pub use http::{
    ClientHandler, Connection, HttpResponse, RequestHandler, RequestKind, Served, StatusReport,
    TcpBinder,
};
pub use network_config::{ServerConfig, WifiConfig};
pub use relay::RelayActuator;
pub use supervisor::{Supervisor, SupervisorState};
pub use wifi::{Connectivity, ConnectivityState, LinkStatus, NetworkSession, Radio};
