//! # Keyboard Module
//!
//! Synthetic keyboard output via Linux uinput.
//!
//! This module handles:
//! - Naming the keys a button can target
//! - Creating a virtual keyboard that declares exactly those keys
//! - Injecting key-down and key-up events

pub mod emitter_trait;
pub mod keys;

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, EventType, InputEvent, Key};
use tracing::{debug, info};

use crate::error::{ControllerError, Result};
pub use emitter_trait::KeyEmitter;
pub use keys::KeyCode;

/// evdev value for a key going down
const KEY_VALUE_PRESSED: i32 = 1;

/// evdev value for a key coming up
const KEY_VALUE_RELEASED: i32 = 0;

/// Virtual keyboard backed by `/dev/uinput`
///
/// Every running program that reads keyboard input sees this device as an
/// ordinary keyboard.
pub struct UinputKeyboard {
    device: VirtualDevice,
    name: String,
}

impl std::fmt::Debug for UinputKeyboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UinputKeyboard")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl UinputKeyboard {
    /// Create a virtual keyboard able to emit `keys`
    ///
    /// # Arguments
    ///
    /// * `name` - Device name shown to the input stack
    /// * `keys` - Keys the device declares
    ///
    /// # Errors
    ///
    /// Returns `Io` if `/dev/uinput` cannot be opened (usually a permissions
    /// problem) or the device cannot be registered.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gamesboy_controller::keyboard::{KeyCode, UinputKeyboard};
    ///
    /// let keyboard = UinputKeyboard::create("Gamesboy Controller", [KeyCode::Z, KeyCode::Enter])?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create<I>(name: &str, keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = KeyCode>,
    {
        let mut supported = AttributeSet::<Key>::new();
        for key in keys {
            supported.insert(key.to_evdev());
        }

        let device = VirtualDeviceBuilder::new()?
            .name(name)
            .with_keys(&supported)?
            .build()?;

        info!("Created virtual keyboard '{}'", name);
        Ok(Self {
            device,
            name: name.to_string(),
        })
    }

    /// Name the virtual device was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    fn emit_key(&mut self, key: KeyCode, value: i32) -> Result<()> {
        let event = InputEvent::new(EventType::KEY, key.to_evdev().code(), value);
        self.device
            .emit(&[event])
            .map_err(|e| ControllerError::Emission(format!("Failed to emit {}: {}", key, e)))?;
        debug!("Emitted {} = {}", key, value);
        Ok(())
    }
}

impl KeyEmitter for UinputKeyboard {
    fn press(&mut self, key: KeyCode) -> Result<()> {
        self.emit_key(key, KEY_VALUE_PRESSED)
    }

    fn release(&mut self, key: KeyCode) -> Result<()> {
        self.emit_key(key, KEY_VALUE_RELEASED)
    }
}
