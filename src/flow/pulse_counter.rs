use core::sync::atomic::{AtomicU32, Ordering};

/// Edge counter shared between the sensor ISR and the main task.
///
/// Both sides go through single atomic read-modify-write instructions, so an edge
/// landing during `sample_and_reset` is either in the returned snapshot or left
/// in the counter for the next one.
#[derive(Debug, Default)]
pub struct PulseCounter {
    pulses: AtomicU32,
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            pulses: AtomicU32::new(0),
        }
    }

    /// ISR entry point. No logging, no allocation.
    #[inline]
    pub fn on_edge(&self) {
        self.pulses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sample_and_reset(&self) -> u32 {
        self.pulses.swap(0, Ordering::AcqRel)
    }

    /// Current count without consuming it
    pub fn peek(&self) -> u32 {
        self.pulses.load(Ordering::Relaxed)
    }
}
