use std::io;

/// Failures grouped by the boundary that recovers from them.
///
/// `HardwareInit` and `Config` abort startup. `Connection`, `ConnectivityLost` and
/// `Listener` are handled by the supervisor's backoff. `Client` never leaves the
/// connection it happened on.
#[derive(Debug)]
pub enum NodeError {
    HardwareInit(String),
    Config(String),
    Connection(String),
    ConnectivityLost,
    Listener(io::Error),
    Client(String),
}

pub type NodeResult<T> = Result<T, NodeError>;

impl std::fmt::Display for NodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            NodeError::HardwareInit(msg) => write!(f, "Hardware init failed: {}", msg),
            NodeError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            NodeError::Connection(msg) => write!(f, "Network connection failed: {}", msg),
            NodeError::ConnectivityLost => write!(f, "WiFi connection lost"),
            NodeError::Listener(e) => write!(f, "Listener error: {}", e),
            NodeError::Client(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for NodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NodeError::Listener(e) => Some(e),
            _ => None,
        }
    }
}
