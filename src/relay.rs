use crate::error::{NodeError, NodeResult};
use core::fmt::Debug;
use embedded_hal::digital::v2::OutputPin;

/// The relay output. Sole owner of the commanded relay state.
///
/// `get` returns the last command, not a read-back of the pin: the interlock acts
/// on what was asked for.
pub struct RelayActuator<P> {
    pin: P,
    on: bool,
}

impl<P> RelayActuator<P>
where
    P: OutputPin,
    P::Error: Debug,
{
    /// Takes the pin and drives it low so the load starts de-energised.
    pub fn new(mut pin: P) -> NodeResult<Self> {
        pin.set_low()
            .map_err(|e| NodeError::HardwareInit(format!("relay pin: {:?}", e)))?;
        log::info!("Relay: initialized OFF");
        Ok(Self { pin, on: false })
    }

    pub fn set(&mut self, on: bool) {
        let result = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = result {
            log::error!("Relay: failed to drive pin {}: {:?}", on_off(on), e);
        }

        if self.on != on {
            log::info!("Relay: {}", on_off(on));
        }
        self.on = on;
    }

    pub fn get(&self) -> bool {
        self.on
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}
