//! # Gamesboy Controller Library
//!
//! Map the Gamesboy's GPIO buttons to keyboard events.
//!
//! This library turns noisy GPIO pin transitions into a clean stream of
//! debounced key presses and releases on a Linux uinput virtual keyboard, so
//! a handheld built around a Raspberry Pi can drive any program that reads
//! keyboard input.

pub mod button;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gpio;
pub mod keyboard;
pub mod lifecycle;
pub mod registry;
pub mod shutdown;
