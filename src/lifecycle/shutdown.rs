//! Shutdown coordination for the proxy.

use tokio::sync::broadcast;

use crate::lifecycle::signals::wait_for_termination;

/// Coordinator for graceful shutdown.
///
/// Servers subscribe before they start; one `trigger` stops all of them.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger once the process receives Ctrl+C or SIGTERM.
    pub fn trigger_on_signal(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            wait_for_termination().await;
            this.trigger();
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves when `rx` observes a trigger, or when the coordinator is gone.
pub async fn signalled(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
}
