//! # Gamesboy Controller
//!
//! Map the Gamesboy's GPIO buttons to keyboard events.
//!
//! Install with:
//! ```bash
//! cargo build --release
//! sudo install target/release/gamesboy-controller /usr/local/bin/gamesboy-controller
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use gamesboy_controller::config::Config;
use gamesboy_controller::gpio::RppalGpio;
use gamesboy_controller::keyboard::UinputKeyboard;
use gamesboy_controller::lifecycle;
use gamesboy_controller::registry::Registry;
use gamesboy_controller::shutdown::{listen_for_signals, ShutdownSignal};

/// Main entry point for the Gamesboy controller
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Set up logging with tracing subscriber
///    - Parse the compiled-in button table and build the pin registry
///    - Open the GPIO peripheral and create the virtual keyboard
///
/// 2. **Running**
///    - Sample every button pin and emit debounced key presses/releases
///    - Wait for Ctrl+C or SIGTERM
///
/// 3. **Graceful Shutdown**
///    - Stop sampling and dispatching
///    - Release every GPIO pin in table order
///
/// # Errors
///
/// Returns error (non-zero exit) if:
/// - The button table is invalid or lists a pin twice
/// - GPIO or uinput cannot be opened
/// - A button pin cannot be acquired
/// - An edge arrives for a pin the registry does not know
///
/// # Examples
///
/// Expected output:
/// ```text
/// INFO gamesboy_controller: Gamesboy Controller v0.1.0 starting...
/// INFO gamesboy_controller::keyboard: Created virtual keyboard 'Gamesboy Controller'
/// INFO gamesboy_controller::lifecycle: Monitoring 8 buttons
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let (writer, _log_guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    info!("Gamesboy Controller v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::builtin().context("Invalid built-in button table")?;

    // Duplicate pins are rejected here, before any pin is touched
    let registry = Arc::new(Registry::build(config.button_specs())?);

    let mut gpio = RppalGpio::open().context("Failed to open GPIO")?;
    let keyboard = UinputKeyboard::create(&config.keyboard.device_name, registry.keys())
        .context("Failed to create virtual keyboard")?;

    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_signals(shutdown.clone()));

    info!("Press Ctrl+C to exit");
    let report = lifecycle::run_with_registry(
        registry,
        config.monitor_settings(),
        &mut gpio,
        Box::new(keyboard),
        shutdown,
    )
    .await?;

    info!(
        "Total keys sent: {} presses, {} releases",
        report.dispatch.presses, report.dispatch.releases
    );

    Ok(())
}
