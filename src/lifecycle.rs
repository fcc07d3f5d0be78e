//! # Lifecycle Controller
//!
//! Starts a monitor for every registered button, waits for shutdown and then
//! releases every pin.
//!
//! ## States
//!
//! ```text
//! Uninitialized -> Running -> ShuttingDown -> Stopped
//! ```
//!
//! - **Startup**: pins are acquired in registration order. If one fails, the
//!   pins already acquired are released in reverse order and startup aborts.
//! - **Running**: the calling task only waits; sampling happens in the
//!   monitor tasks and key emission in the dispatcher task.
//! - **Shutdown**: every monitor is stopped and its pin released in
//!   registration order. A failed release is logged and the rest continue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::button::{ButtonMonitor, EdgeEvent, MonitorSettings};
use crate::config::Config;
use crate::dispatcher::{DispatchStats, Dispatcher};
use crate::error::{ControllerError, Result};
use crate::gpio::{InputPin, PinProvider};
use crate::keyboard::KeyEmitter;
use crate::registry::{PinId, Registry};
use crate::shutdown::ShutdownSignal;

/// Capacity of the monitor → dispatcher edge channel
const EDGE_CHANNEL_CAPACITY: usize = 64;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Running,
    ShuttingDown,
    Stopped,
}

/// Outcome of a completed shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    pub released: usize,
    pub release_failures: usize,
    pub dispatch: DispatchStats,
}

/// Owns the monitors and the dispatcher for one controller
pub struct Lifecycle {
    registry: Arc<Registry>,
    settings: MonitorSettings,
    state: LifecycleState,
    shutdown: ShutdownSignal,
    /// Monitor tasks in registration order
    monitors: Vec<(PinId, JoinHandle<Box<dyn InputPin + Send>>)>,
    dispatcher: Option<JoinHandle<Result<DispatchStats>>>,
}

impl Lifecycle {
    pub fn new(registry: Arc<Registry>, settings: MonitorSettings, shutdown: ShutdownSignal) -> Self {
        Self {
            registry,
            settings,
            state: LifecycleState::Uninitialized,
            shutdown,
            monitors: Vec::new(),
            dispatcher: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Acquire every pin and start the monitors and the dispatcher
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns the acquisition error for the first pin that cannot be
    /// claimed, after releasing the pins claimed before it.
    pub fn start(
        &mut self,
        provider: &mut dyn PinProvider,
        emitter: Box<dyn KeyEmitter + Send>,
    ) -> Result<()> {
        if self.state != LifecycleState::Uninitialized {
            warn!("Lifecycle already started ({:?})", self.state);
            return Ok(());
        }

        let pins = acquire_all(&self.registry, &self.settings, provider)?;

        let (tx, rx) = mpsc::channel::<EdgeEvent>(EDGE_CHANNEL_CAPACITY);
        let dispatcher = Dispatcher::new(Arc::clone(&self.registry), emitter);
        self.dispatcher = Some(tokio::spawn(dispatcher.run(rx, self.shutdown.clone())));

        for pin in pins {
            let pin_id = pin.pin_id();
            let monitor = ButtonMonitor::new(pin, &self.settings);
            let handle = tokio::spawn(monitor.run(tx.clone(), self.shutdown.clone()));
            self.monitors.push((pin_id, handle));
        }

        self.state = LifecycleState::Running;
        info!("Monitoring {} buttons", self.monitors.len());
        Ok(())
    }

    /// Block until shutdown is requested, then stop and release everything
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's fatal error if it stopped on its own, or
    /// `TaskFailed` if it panicked; pins are still released first.
    pub async fn run_until_shutdown(&mut self) -> Result<ShutdownReport> {
        if self.state != LifecycleState::Running {
            warn!("Lifecycle not running ({:?})", self.state);
            return Ok(ShutdownReport::default());
        }

        let mut dispatcher = match self.dispatcher.take() {
            Some(handle) => handle,
            None => return Ok(self.stop(None).await),
        };

        let finished = tokio::select! {
            _ = self.shutdown.wait() => None,
            result = &mut dispatcher => Some(result),
        };

        let dispatch_result = match finished {
            Some(result) => {
                // Dispatcher stopped without a shutdown request
                self.shutdown.trigger();
                result
            }
            None => {
                self.state = LifecycleState::ShuttingDown;
                dispatcher.await
            }
        };

        let failure = match dispatch_result {
            Ok(Ok(stats)) => return Ok(self.stop(Some(stats)).await),
            Ok(Err(e)) => e,
            Err(e) => ControllerError::TaskFailed(format!("dispatcher: {}", e)),
        };

        error!("Dispatcher failed: {}", failure);
        let report = self.stop(None).await;
        info!("Released {} pins after dispatcher failure", report.released);
        Err(failure)
    }

    /// Stop every monitor and release its pin in registration order
    async fn stop(&mut self, dispatch: Option<DispatchStats>) -> ShutdownReport {
        self.state = LifecycleState::ShuttingDown;
        self.shutdown.trigger();
        info!("Shutting down, releasing {} pins", self.monitors.len());

        let mut report = ShutdownReport {
            dispatch: dispatch.unwrap_or_default(),
            ..ShutdownReport::default()
        };

        for (pin_id, handle) in self.monitors.drain(..) {
            match handle.await {
                Ok(pin) => match pin.release() {
                    Ok(()) => report.released += 1,
                    Err(e) => {
                        report.release_failures += 1;
                        warn!("{}", e);
                    }
                },
                Err(e) => {
                    report.release_failures += 1;
                    error!("Monitor for pin {} panicked, pin not released: {}", pin_id, e);
                }
            }
        }

        self.state = LifecycleState::Stopped;
        info!(
            "Stopped: {} pins released, {} release failures",
            report.released, report.release_failures
        );
        report
    }
}

/// Claim every registered pin in order, unwinding on the first failure
fn acquire_all(
    registry: &Registry,
    settings: &MonitorSettings,
    provider: &mut dyn PinProvider,
) -> Result<Vec<Box<dyn InputPin + Send>>> {
    let mut acquired: Vec<Box<dyn InputPin + Send>> = Vec::with_capacity(registry.len());

    for button in registry.iter() {
        match provider.acquire(button.pin, settings.pull) {
            Ok(pin) => {
                info!("Button '{}' on pin {} -> {}", button.name, button.pin, button.key);
                acquired.push(pin);
            }
            Err(e) => {
                error!("Failed to acquire pin {} for '{}': {}", button.pin, button.name, e);
                while let Some(pin) = acquired.pop() {
                    let pin_id = pin.pin_id();
                    if let Err(release_err) = pin.release() {
                        warn!("Unwinding pin {}: {}", pin_id, release_err);
                    }
                }
                return Err(e);
            }
        }
    }

    Ok(acquired)
}

/// Build the registry from `config`, run the controller until shutdown and
/// release everything.
///
/// The registry is built, and duplicate pins rejected, before any pin is
/// acquired.
///
/// # Errors
///
/// Returns any startup error (`DuplicatePin`, `PinAcquisition`) or a fatal
/// dispatch error (`UnknownPin`).
pub async fn run(
    config: &Config,
    provider: &mut dyn PinProvider,
    emitter: Box<dyn KeyEmitter + Send>,
    shutdown: ShutdownSignal,
) -> Result<ShutdownReport> {
    let registry = Arc::new(Registry::build(config.button_specs())?);
    run_with_registry(registry, config.monitor_settings(), provider, emitter, shutdown).await
}

/// Same as [`run`] with an already-built registry
pub async fn run_with_registry(
    registry: Arc<Registry>,
    settings: MonitorSettings,
    provider: &mut dyn PinProvider,
    emitter: Box<dyn KeyEmitter + Send>,
    shutdown: ShutdownSignal,
) -> Result<ShutdownReport> {
    if registry.is_empty() {
        return Err(ControllerError::Config(serde::de::Error::custom(
            "no buttons registered",
        )));
    }

    let mut lifecycle = Lifecycle::new(registry, settings, shutdown);
    lifecycle.start(provider, emitter)?;
    lifecycle.run_until_shutdown().await
}
