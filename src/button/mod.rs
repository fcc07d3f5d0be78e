//! # Button Module
//!
//! Debounced edge detection for the controller's physical buttons.
//!
//! This module handles:
//! - Per-pin debounce state and edge classification
//! - Sampling each claimed pin on its own task
//! - Delivering pressed/released edges to the dispatcher

pub mod debounce;
pub mod monitor;

pub use debounce::{EdgeDirection, PinState};
pub use monitor::{ButtonMonitor, EdgeEvent, MonitorSettings};
