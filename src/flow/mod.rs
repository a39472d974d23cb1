pub mod config;
pub mod estimator;
pub mod pulse_counter;
#[cfg(target_os = "espidf")]
pub mod sensor;

pub use config::FlowConfig;
pub use estimator::{Clock, FlowEstimator, FlowReading, MonotonicClock};
pub use pulse_counter::PulseCounter;
