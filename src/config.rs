//! # Configuration Module
//!
//! Parses and validates the compiled-in button table.
//!
//! The table lives in `config/buttons.toml` and is embedded into the binary,
//! so nothing is read from disk at runtime.

use serde::de::Error;
use serde::Deserialize;
use std::time::Duration;

use crate::button::MonitorSettings;
use crate::error::{ControllerError, Result};
use crate::gpio::PullDirection;
use crate::keyboard::KeyCode;
use crate::registry::{ButtonSpec, PinId};

/// Button table embedded at build time
pub const BUILTIN_CONFIG: &str = include_str!("../config/buttons.toml");

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub gpio: GpioConfig,
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub buttons: Vec<ButtonConfig>,
}

/// GPIO sampling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GpioConfig {
    #[serde(default = "default_pull_up")]
    pub pull_up: bool,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

/// Virtual keyboard configuration
#[derive(Debug, Deserialize, Clone)]
pub struct KeyboardConfig {
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

/// One row of the button table
#[derive(Debug, Deserialize, Clone)]
pub struct ButtonConfig {
    pub pin: PinId,
    pub name: String,
    #[serde(deserialize_with = "deserialize_key")]
    pub key: KeyCode,
}

// Default value functions
fn default_pull_up() -> bool { false }
fn default_debounce_ms() -> u64 { crate::button::debounce::DEFAULT_DEBOUNCE_MS }
fn default_sample_interval_ms() -> u64 { crate::button::monitor::DEFAULT_SAMPLE_INTERVAL_MS }

fn default_device_name() -> String { "Gamesboy Controller".to_string() }

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            pull_up: default_pull_up(),
            debounce_ms: default_debounce_ms(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
        }
    }
}

fn deserialize_key<'de, D>(deserializer: D) -> std::result::Result<KeyCode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(D::Error::custom)
}

impl Config {
    /// Parse and validate the button table compiled into the binary
    ///
    /// # Examples
    ///
    /// ```
    /// use gamesboy_controller::config::Config;
    ///
    /// let config = Config::builtin()?;
    /// assert_eq!(config.buttons.len(), 8);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CONFIG)
    }

    /// Parse and validate a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns `Config` if parsing or validation fails.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Button table rows as registry entries, in table order
    pub fn button_specs(&self) -> Vec<ButtonSpec> {
        self.buttons
            .iter()
            .map(|b| ButtonSpec::new(b.pin, b.name.clone(), b.key))
            .collect()
    }

    /// Monitor timing and polarity
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            pull: PullDirection::from_pull_up(self.gpio.pull_up),
            debounce: Duration::from_millis(self.gpio.debounce_ms),
            sample_interval: Duration::from_millis(self.gpio.sample_interval_ms),
        }
    }

    /// Validate configuration values
    ///
    /// Duplicate pins are not checked here; the registry rejects them.
    fn validate(&self) -> Result<()> {
        if self.buttons.is_empty() {
            return Err(ControllerError::Config(
                toml::de::Error::custom("button table cannot be empty")
            ));
        }

        for button in &self.buttons {
            if button.name.trim().is_empty() {
                return Err(ControllerError::Config(
                    toml::de::Error::custom(format!("button on pin {} has an empty name", button.pin))
                ));
            }
        }

        if self.gpio.debounce_ms > 1000 {
            return Err(ControllerError::Config(
                toml::de::Error::custom("debounce_ms must be between 0 and 1000")
            ));
        }

        if self.gpio.sample_interval_ms == 0 || self.gpio.sample_interval_ms > 100 {
            return Err(ControllerError::Config(
                toml::de::Error::custom("sample_interval_ms must be between 1 and 100")
            ));
        }

        if self.gpio.debounce_ms > 0 && self.gpio.sample_interval_ms > self.gpio.debounce_ms {
            return Err(ControllerError::Config(
                toml::de::Error::custom("sample_interval_ms must not exceed debounce_ms")
            ));
        }

        if self.keyboard.device_name.trim().is_empty() {
            return Err(ControllerError::Config(
                toml::de::Error::custom("keyboard device_name cannot be empty")
            ));
        }

        Ok(())
    }
}
