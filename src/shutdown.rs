//! # Shutdown Signal
//!
//! One-shot, idempotent termination trigger shared by the lifecycle, the
//! monitors and the dispatcher, plus forwarding of OS signals into it.

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{info, warn};

/// Cloneable handle to the process-wide shutdown flag
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request shutdown.
    ///
    /// Returns `true` only for the call that actually flipped the flag;
    /// later calls are no-ops.
    pub fn trigger(&self) -> bool {
        self.tx.send_if_modified(|triggered| {
            if *triggered {
                false
            } else {
                *triggered = true;
                true
            }
        })
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until shutdown has been requested.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            let triggered = *rx.borrow_and_update();
            if triggered {
                return;
            }
            // The sender lives as long as `self`, so this cannot fail.
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Forward Ctrl+C and SIGTERM into `shutdown` until the process exits.
///
/// Repeated signals are logged and otherwise ignored.
pub async fn listen_for_signals(shutdown: ShutdownSignal) {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            None
        }
    };

    loop {
        let name = tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    warn!("Cannot listen for Ctrl+C: {}", e);
                    return;
                }
                "Ctrl+C"
            }
            Some(_) = async {
                match terminate.as_mut() {
                    Some(stream) => stream.recv().await,
                    None => std::future::pending().await,
                }
            } => "SIGTERM",
        };

        if shutdown.trigger() {
            info!("Received {}, shutting down...", name);
        } else {
            info!("Received {} while already shutting down, ignoring", name);
        }
    }
}
