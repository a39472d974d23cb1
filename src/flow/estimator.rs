use super::config::FlowConfig;
use super::pulse_counter::PulseCounter;
use embedded_hal::blocking::delay::DelayMs;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Monotonic millisecond source, the `ticks_ms` of the board.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// `Clock` backed by `std::time::Instant` (esp_timer on ESP-IDF).
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    boot: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            boot: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.boot.elapsed().as_millis() as u64
    }
}

/// One measurement; never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowReading {
    pub pulses: u32,
    pub elapsed: Duration,
    /// Litres per minute, rounded to two decimals
    pub rate_lpm: f64,
}

impl FlowReading {
    pub fn from_pulses(pulses: u32, elapsed: Duration, calibration_factor: f64) -> Self {
        // Millisecond ticks, as the window is timed.
        let secs = elapsed.as_millis() as f64 / 1000.0;
        let rate_lpm = if secs <= f64::EPSILON || calibration_factor <= 0.0 {
            0.0
        } else {
            round_2dp((f64::from(pulses) / calibration_factor) * (60.0 / secs))
        };

        Self {
            pulses,
            elapsed,
            rate_lpm,
        }
    }

    pub fn is_flowing(&self) -> bool {
        self.rate_lpm != 0.0
    }
}

/// Ties go to the even cent.
fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Turns the pulse count into a flow rate over a blocking sampling window.
///
/// The window blocks the calling task; with a single server task that means no
/// other request is served while a reading is in progress.
pub struct FlowEstimator<C, D> {
    counter: Arc<PulseCounter>,
    clock: C,
    delay: D,
    config: FlowConfig,
}

impl<C, D> FlowEstimator<C, D>
where
    C: Clock,
    D: DelayMs<u32>,
{
    pub fn new(counter: Arc<PulseCounter>, clock: C, delay: D, config: FlowConfig) -> Self {
        Self {
            counter,
            clock,
            delay,
            config,
        }
    }

    /// Measure over the configured window
    pub fn measure(&mut self) -> FlowReading {
        self.measure_over(self.config.sample_window_ms)
    }

    pub fn measure_over(&mut self, window_ms: u32) -> FlowReading {
        let start = self.clock.now_ms();
        self.delay.delay_ms(window_ms);
        // Real elapsed time, not the nominal window: the scheduler may oversleep.
        let elapsed_ms = self.clock.now_ms().saturating_sub(start);
        let pulses = self.counter.sample_and_reset();

        let reading = FlowReading::from_pulses(
            pulses,
            Duration::from_millis(elapsed_ms),
            self.config.calibration_factor,
        );
        log::debug!(
            "Flow: {} pulses in {}ms -> {:.2} L/min",
            pulses,
            elapsed_ms,
            reading.rate_lpm
        );
        reading
    }
}
