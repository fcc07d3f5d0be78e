//! # Button Monitor
//!
//! Samples one GPIO pin on a fixed interval, runs the samples through the
//! pin's [`PinState`] and forwards committed edges to the dispatcher.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::button::debounce::{EdgeDirection, PinState};
use crate::gpio::{InputPin, PullDirection};
use crate::registry::PinId;
use crate::shutdown::ShutdownSignal;

/// Default pin sampling period in milliseconds
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1;

/// A committed edge on one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeEvent {
    pub pin: PinId,
    pub direction: EdgeDirection,
    /// Time of the sample that committed the edge
    pub timestamp: std::time::Instant,
}

/// Timing and polarity shared by every monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub pull: PullDirection,
    pub debounce: Duration,
    pub sample_interval: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            pull: PullDirection::Down,
            debounce: Duration::from_millis(crate::button::debounce::DEFAULT_DEBOUNCE_MS),
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
        }
    }
}

/// Watches a single pin
pub struct ButtonMonitor {
    pin: Box<dyn InputPin + Send>,
    state: PinState,
    sample_interval: Duration,
}

impl ButtonMonitor {
    pub fn new(pin: Box<dyn InputPin + Send>, settings: &MonitorSettings) -> Self {
        Self {
            pin,
            state: PinState::new(settings.pull, settings.debounce),
            sample_interval: settings.sample_interval,
        }
    }

    pub fn pin_id(&self) -> PinId {
        self.pin.pin_id()
    }

    /// Read the pin once and return the edge it commits, if any.
    ///
    /// A failed read is logged and skipped.
    pub fn sample(&mut self, now: Instant) -> Option<EdgeEvent> {
        let level = match self.pin.read_level() {
            Ok(level) => level,
            Err(e) => {
                warn!("Skipping sample: {}", e);
                return None;
            }
        };

        let now = now.into_std();
        self.state.observe(level, now).map(|direction| EdgeEvent {
            pin: self.pin.pin_id(),
            direction,
            timestamp: now,
        })
    }

    /// Sample until shutdown, sending each committed edge to `events`.
    ///
    /// Returns the pin so the caller can release it.
    pub async fn run(
        mut self,
        events: mpsc::Sender<EdgeEvent>,
        shutdown: ShutdownSignal,
    ) -> Box<dyn InputPin + Send> {
        let mut ticker = interval(self.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!("Monitoring GPIO pin {}", self.pin_id());

        loop {
            tokio::select! {
                biased;

                _ = shutdown.wait() => break,

                _ = ticker.tick() => {
                    // Stamp with the read time; a delayed tick reports when it was due.
                    let Some(event) = self.sample(Instant::now()) else {
                        continue;
                    };
                    debug!("Pin {} {:?}", event.pin, event.direction);
                    if events.send(event).await.is_err() {
                        debug!("Dispatcher gone, stopping monitor for pin {}", event.pin);
                        break;
                    }
                }
            }
        }

        debug!("Stopped monitoring GPIO pin {}", self.pin_id());
        self.pin
    }
}
