//! Shutdown coordination for the proxy.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that the server and any other long-running
/// task subscribe to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Number of tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for `task` to finish draining, giving up after `deadline`.
///
/// Returns `false` when the deadline passed first.
pub async fn drain_with_deadline<F: Future>(task: F, deadline: Duration) -> bool {
    match tokio::time::timeout(deadline, task).await {
        Ok(_) => true,
        Err(_) => {
            tracing::warn!(deadline = ?deadline, "Shutdown deadline exceeded, exiting anyway");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 1);

        shutdown.trigger();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_drain_with_deadline() {
        assert!(drain_with_deadline(async {}, Duration::from_millis(50)).await);
        assert!(!drain_with_deadline(std::future::pending::<()>(), Duration::from_millis(20)).await);
    }
}
