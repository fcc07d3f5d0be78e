//! # GPIO Module
//!
//! Raspberry Pi GPIO input pins via `rppal`.
//!
//! This module handles:
//! - Opening the GPIO peripheral
//! - Claiming button pins as inputs with a pull-up or pull-down resistor
//! - Reading raw pin levels for the button monitors
//! - Returning pins to the system on shutdown

pub mod pin_trait;

use rppal::gpio::Gpio;
use tracing::debug;

use crate::error::{ControllerError, Result};
use crate::registry::PinId;
pub use pin_trait::{InputPin, PinProvider, PullDirection};

/// Raspberry Pi GPIO peripheral
pub struct RppalGpio {
    gpio: Gpio,
}

impl std::fmt::Debug for RppalGpio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RppalGpio").finish_non_exhaustive()
    }
}

impl RppalGpio {
    /// Open the GPIO peripheral
    ///
    /// # Errors
    ///
    /// Returns `Gpio` if the board is not supported or `/dev/gpiomem` cannot
    /// be opened.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamesboy_controller::gpio::{PinProvider, PullDirection, RppalGpio};
    ///
    /// let mut gpio = RppalGpio::open()?;
    /// let mut pin = gpio.acquire(26, PullDirection::Down)?;
    /// println!("pin 26 high: {}", pin.read_level()?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open() -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| ControllerError::Gpio(e.to_string()))?;
        Ok(Self { gpio })
    }
}

impl PinProvider for RppalGpio {
    fn acquire(&mut self, pin: PinId, pull: PullDirection) -> Result<Box<dyn InputPin + Send>> {
        let raw = self.gpio.get(pin).map_err(|e| ControllerError::PinAcquisition {
            pin,
            reason: e.to_string(),
        })?;

        let input = match pull {
            PullDirection::Up => raw.into_input_pullup(),
            PullDirection::Down => raw.into_input_pulldown(),
        };

        debug!("Acquired GPIO pin {} ({:?})", pin, pull);
        Ok(Box::new(RppalInputPin { pin, input }))
    }
}

/// A claimed Raspberry Pi input pin
pub struct RppalInputPin {
    pin: PinId,
    input: rppal::gpio::InputPin,
}

impl InputPin for RppalInputPin {
    fn pin_id(&self) -> PinId {
        self.pin
    }

    fn read_level(&mut self) -> Result<bool> {
        Ok(self.input.is_high())
    }

    fn release(self: Box<Self>) -> Result<()> {
        // Dropping the rppal pin restores its original mode and pull state.
        let pin = self.pin;
        drop(self);
        debug!("Released GPIO pin {}", pin);
        Ok(())
    }
}
