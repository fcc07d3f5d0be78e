//! Trait abstraction for GPIO input pins to enable testing

use crate::error::Result;
use crate::registry::PinId;

/// Which internal resistor holds the pin at rest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullDirection {
    /// Pin rests high; pressing the button pulls it to ground
    Up,
    /// Pin rests low; pressing the button drives it high
    Down,
}

impl PullDirection {
    /// Build from a `pull_up` flag
    pub fn from_pull_up(pull_up: bool) -> Self {
        if pull_up {
            PullDirection::Up
        } else {
            PullDirection::Down
        }
    }

    /// Logic level read while the button is not pressed
    pub fn rest_level(self) -> bool {
        matches!(self, PullDirection::Up)
    }
}

/// Source of GPIO input pins
pub trait PinProvider {
    /// Claim `pin` as an input with the given pull resistor
    fn acquire(&mut self, pin: PinId, pull: PullDirection) -> Result<Box<dyn InputPin + Send>>;
}

/// A claimed GPIO input pin
pub trait InputPin {
    /// Pin number this handle owns
    fn pin_id(&self) -> PinId;

    /// Read the raw logic level (`true` = high)
    fn read_level(&mut self) -> Result<bool>;

    /// Give the pin back to the system
    fn release(self: Box<Self>) -> Result<()>;
}
