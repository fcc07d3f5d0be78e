//! # Dispatcher
//!
//! Turns committed pin edges into key presses and releases.
//!
//! The dispatcher is the single consumer of the monitors' edge channel, so
//! edges from different pins are handled strictly one at a time.
//!
//! ## Failure handling
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Edge for an unregistered pin | Fatal, returned as `UnknownPin` |
//! | Keyboard rejects press/release | Logged, counted, dispatch continues |

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::button::{EdgeDirection, EdgeEvent};
use crate::error::{ControllerError, Result};
use crate::keyboard::KeyEmitter;
use crate::registry::{PinId, Registry};
use crate::shutdown::ShutdownSignal;

/// Counters reported when the dispatcher stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub presses: u64,
    pub releases: u64,
    pub emission_failures: u64,
    /// Edges still queued when shutdown began
    pub discarded: u64,
}

/// Routes edges to the keyboard
pub struct Dispatcher {
    registry: Arc<Registry>,
    emitter: Box<dyn KeyEmitter + Send>,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>, emitter: Box<dyn KeyEmitter + Send>) -> Self {
        Self {
            registry,
            emitter,
            stats: DispatchStats::default(),
        }
    }

    /// Handle one committed edge
    ///
    /// # Errors
    ///
    /// Returns `UnknownPin` if `pin` is not in the registry. Emission failures
    /// are logged and do not produce an error.
    pub fn on_edge(&mut self, pin: PinId, direction: EdgeDirection) -> Result<()> {
        let button = self
            .registry
            .lookup(pin)
            .ok_or(ControllerError::UnknownPin(pin))?;

        let result = match direction {
            EdgeDirection::Pressed => {
                debug!("Keypress Down: {} ({}) [{}]", button.name, button.key, pin);
                self.emitter.press(button.key)
            }
            EdgeDirection::Released => {
                debug!("Keypress Up: {} ({}) [{}]", button.name, button.key, pin);
                self.emitter.release(button.key)
            }
        };

        match result {
            Ok(()) => match direction {
                EdgeDirection::Pressed => self.stats.presses += 1,
                EdgeDirection::Released => self.stats.releases += 1,
            },
            Err(e) => {
                self.stats.emission_failures += 1;
                error!("Lost {:?} of '{}' on pin {}: {}", direction, button.name, pin, e);
            }
        }

        Ok(())
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Consume edges until shutdown or until every monitor has stopped.
    ///
    /// Shutdown is checked before each edge, so nothing is emitted once it
    /// has been requested; edges left in the channel are counted as discarded.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error from [`Dispatcher::on_edge`].
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<EdgeEvent>,
        shutdown: ShutdownSignal,
    ) -> Result<DispatchStats> {
        loop {
            tokio::select! {
                biased;

                _ = shutdown.wait() => break,

                event = events.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    if shutdown.is_triggered() {
                        self.stats.discarded += 1;
                        break;
                    }
                    self.on_edge(event.pin, event.direction)?;
                }
            }
        }

        events.close();
        while events.try_recv().is_ok() {
            self.stats.discarded += 1;
        }

        info!(
            "Dispatcher stopped: {} presses, {} releases, {} emission failures, {} discarded",
            self.stats.presses, self.stats.releases, self.stats.emission_failures, self.stats.discarded
        );
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::emitter_trait::mocks::{KeyAction, RecordingKeyboard};
    use crate::keyboard::emitter_trait::MockKeyEmitter;
    use crate::keyboard::KeyCode;
    use crate::registry::ButtonSpec;
    use mockall::predicate::eq;
    use mockall::Sequence;
    use std::time::Instant;

    fn registry() -> Arc<Registry> {
        Arc::new(
            Registry::build(vec![
                ButtonSpec::new(26, "a", KeyCode::Z),
                ButtonSpec::new(16, "b", KeyCode::X),
                ButtonSpec::new(23, "start", KeyCode::Enter),
            ])
            .expect("valid registry"),
        )
    }

    fn edge(pin: PinId, direction: EdgeDirection) -> EdgeEvent {
        EdgeEvent {
            pin,
            direction,
            timestamp: Instant::now(),
        }
    }

    // ==================== on_edge Tests ====================

    #[test]
    fn test_press_and_release_in_order() {
        let mut emitter = MockKeyEmitter::new();
        let mut seq = Sequence::new();
        emitter
            .expect_press()
            .with(eq(KeyCode::Z))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        emitter
            .expect_release()
            .with(eq(KeyCode::Z))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut dispatcher = Dispatcher::new(registry(), Box::new(emitter));
        assert!(dispatcher.on_edge(26, EdgeDirection::Pressed).is_ok());
        assert!(dispatcher.on_edge(26, EdgeDirection::Released).is_ok());

        let stats = dispatcher.stats();
        assert_eq!(stats.presses, 1);
        assert_eq!(stats.releases, 1);
    }

    #[test]
    fn test_unknown_pin_is_fatal() {
        let mut emitter = MockKeyEmitter::new();
        emitter.expect_press().never();
        emitter.expect_release().never();

        let mut dispatcher = Dispatcher::new(registry(), Box::new(emitter));
        match dispatcher.on_edge(4, EdgeDirection::Pressed) {
            Err(ControllerError::UnknownPin(pin)) => assert_eq!(pin, 4),
            other => panic!("Expected UnknownPin error, got: {:?}", other),
        }
    }

    #[test]
    fn test_emission_failure_is_not_fatal() {
        let mut emitter = MockKeyEmitter::new();
        emitter
            .expect_press()
            .with(eq(KeyCode::Enter))
            .times(1)
            .returning(|_| Err(ControllerError::Emission("uinput gone".to_string())));

        let mut dispatcher = Dispatcher::new(registry(), Box::new(emitter));
        assert!(dispatcher.on_edge(23, EdgeDirection::Pressed).is_ok());

        let stats = dispatcher.stats();
        assert_eq!(stats.emission_failures, 1);
        assert_eq!(stats.presses, 0);
    }

    #[test]
    fn test_failure_does_not_block_later_edges() {
        let keyboard = RecordingKeyboard::new();
        keyboard.set_failures(1);

        let mut dispatcher = Dispatcher::new(registry(), Box::new(keyboard.clone()));
        dispatcher.on_edge(26, EdgeDirection::Pressed).unwrap();
        dispatcher.on_edge(16, EdgeDirection::Pressed).unwrap();
        dispatcher.on_edge(16, EdgeDirection::Released).unwrap();

        assert_eq!(
            keyboard.get_actions(),
            vec![KeyAction::Press(KeyCode::X), KeyAction::Release(KeyCode::X)]
        );
        assert_eq!(dispatcher.stats().emission_failures, 1);
    }

    // ==================== run Tests ====================

    #[tokio::test]
    async fn test_run_until_channel_closes() {
        let keyboard = RecordingKeyboard::new();
        let dispatcher = Dispatcher::new(registry(), Box::new(keyboard.clone()));
        let (tx, rx) = mpsc::channel(8);

        tx.send(edge(26, EdgeDirection::Pressed)).await.unwrap();
        tx.send(edge(16, EdgeDirection::Pressed)).await.unwrap();
        tx.send(edge(26, EdgeDirection::Released)).await.unwrap();
        drop(tx);

        let stats = dispatcher.run(rx, ShutdownSignal::new()).await.unwrap();
        assert_eq!(stats.presses, 2);
        assert_eq!(stats.releases, 1);
        assert_eq!(
            keyboard.get_actions(),
            vec![
                KeyAction::Press(KeyCode::Z),
                KeyAction::Press(KeyCode::X),
                KeyAction::Release(KeyCode::Z),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_discards_after_shutdown() {
        let keyboard = RecordingKeyboard::new();
        let dispatcher = Dispatcher::new(registry(), Box::new(keyboard.clone()));
        let (tx, rx) = mpsc::channel(8);
        let shutdown = ShutdownSignal::new();

        tx.send(edge(26, EdgeDirection::Pressed)).await.unwrap();
        tx.send(edge(26, EdgeDirection::Released)).await.unwrap();
        shutdown.trigger();

        let stats = dispatcher.run(rx, shutdown).await.unwrap();
        assert!(keyboard.get_actions().is_empty(), "No key may be emitted after shutdown");
        assert_eq!(stats.discarded, 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_unknown_pin() {
        let keyboard = RecordingKeyboard::new();
        let dispatcher = Dispatcher::new(registry(), Box::new(keyboard.clone()));
        let (tx, rx) = mpsc::channel(8);

        tx.send(edge(26, EdgeDirection::Pressed)).await.unwrap();
        tx.send(edge(99, EdgeDirection::Pressed)).await.unwrap();

        let result = dispatcher.run(rx, ShutdownSignal::new()).await;
        assert!(matches!(result, Err(ControllerError::UnknownPin(99))));
        assert_eq!(keyboard.get_actions(), vec![KeyAction::Press(KeyCode::Z)]);
    }
}
