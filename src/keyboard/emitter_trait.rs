//! Trait abstraction for keyboard emission to enable testing

use crate::error::Result;
use crate::keyboard::keys::KeyCode;

/// Trait for synthetic keyboard output
#[cfg_attr(test, mockall::automock)]
pub trait KeyEmitter {
    /// Inject a key-down event
    fn press(&mut self, key: KeyCode) -> Result<()>;

    /// Inject a key-up event
    fn release(&mut self, key: KeyCode) -> Result<()>;
}
