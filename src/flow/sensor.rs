use super::pulse_counter::PulseCounter;
use crate::error::{NodeError, NodeResult};
use esp_idf_hal::gpio::{Input, InputPin, InterruptType, OutputPin, PinDriver, Pull};
use std::sync::Arc;

/// Wire the flow sensor input to the pulse counter.
///
/// Pull-up, falling-edge interrupt. The returned driver must stay alive for the
/// subscription to remain active.
pub fn attach<P: InputPin + OutputPin>(
    mut pin: PinDriver<'static, P, Input>,
    counter: Arc<PulseCounter>,
) -> NodeResult<PinDriver<'static, P, Input>> {
    let gpio = pin.pin();

    pin.set_pull(Pull::Up)
        .map_err(|e| NodeError::HardwareInit(format!("GPIO{} pull-up: {:?}", gpio, e)))?;
    pin.set_interrupt_type(InterruptType::NegEdge)
        .map_err(|e| NodeError::HardwareInit(format!("GPIO{} edge type: {:?}", gpio, e)))?;

    // Safety: the ISR touches only the atomic counter and the GPIO interrupt
    // enable register.
    unsafe {
        pin.subscribe(move || {
            counter.on_edge();
            // The driver masks the line after every trigger; re-arm it here.
            esp_idf_sys::gpio_intr_enable(gpio);
        })
        .map_err(|e| NodeError::HardwareInit(format!("GPIO{} ISR: {:?}", gpio, e)))?;
    }

    pin.enable_interrupt()
        .map_err(|e| NodeError::HardwareInit(format!("GPIO{} interrupt: {:?}", gpio, e)))?;

    log::info!("Flow sensor: GPIO{} falling-edge interrupt armed", gpio);
    Ok(pin)
}
