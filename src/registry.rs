//! # Pin Registry
//!
//! Static mapping from GPIO pin to button identity and target key.
//!
//! Built once at startup and shared read-only (behind an `Arc`) by every
//! button monitor and the dispatcher.

use std::collections::HashMap;

use crate::error::{ControllerError, Result};
use crate::keyboard::KeyCode;

/// GPIO pin identifier (BCM numbering)
pub type PinId = u8;

/// One physical button: which pin it is wired to and which key it types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSpec {
    /// GPIO pin the button is wired to
    pub pin: PinId,
    /// Logical button name on the controller (e.g. "a", "select")
    pub name: String,
    /// Key injected while the button is held
    pub key: KeyCode,
}

impl ButtonSpec {
    pub fn new(pin: PinId, name: impl Into<String>, key: KeyCode) -> Self {
        Self {
            pin,
            name: name.into(),
            key,
        }
    }
}

/// Immutable pin → button table
#[derive(Debug, Clone)]
pub struct Registry {
    /// Buttons in registration order
    buttons: Vec<ButtonSpec>,
    /// Pin → index into `buttons`
    index: HashMap<PinId, usize>,
}

impl Registry {
    /// Build the registry from a button table
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePin` for the first pin that appears twice.
    ///
    /// # Examples
    ///
    /// ```
    /// use gamesboy_controller::keyboard::KeyCode;
    /// use gamesboy_controller::registry::{ButtonSpec, Registry};
    ///
    /// let registry = Registry::build(vec![ButtonSpec::new(26, "a", KeyCode::Z)])?;
    /// assert_eq!(registry.lookup(26).map(|b| b.key), Some(KeyCode::Z));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn build<I>(buttons: I) -> Result<Self>
    where
        I: IntoIterator<Item = ButtonSpec>,
    {
        let mut registry = Registry {
            buttons: Vec::new(),
            index: HashMap::new(),
        };

        for button in buttons {
            if registry.index.contains_key(&button.pin) {
                return Err(ControllerError::DuplicatePin(button.pin));
            }
            registry.index.insert(button.pin, registry.buttons.len());
            registry.buttons.push(button);
        }

        Ok(registry)
    }

    /// Look up the button wired to `pin`
    pub fn lookup(&self, pin: PinId) -> Option<&ButtonSpec> {
        self.index.get(&pin).map(|&i| &self.buttons[i])
    }

    /// Buttons in registration order
    pub fn iter(&self) -> impl Iterator<Item = &ButtonSpec> {
        self.buttons.iter()
    }

    /// Every key some button can emit, without duplicates
    pub fn keys(&self) -> Vec<KeyCode> {
        let mut keys: Vec<KeyCode> = self.buttons.iter().map(|b| b.key).collect();
        keys.sort();
        keys.dedup();
        keys
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }
}
