//! Gateway stop latch.
//!
//! A `watch` channel holding `true` once shutdown has been requested. Unlike
//! a broadcast, the state is sticky: a server that starts listening after
//! the trigger (e.g. a gateway torn down before its task was polled) still
//! stops instead of serving forever.

use tokio::sync::watch;

/// Requests a stop of every [`StopSignal`] handed out.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    pub fn subscribe(&self) -> StopSignal {
        StopSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving half handed to the HTTP server.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Resolve once shutdown is requested, immediately if it already was.
    ///
    /// Dropping every [`Shutdown`] handle also counts as a stop request.
    pub async fn stopped(mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}
