//! Shutdown signalling shared by every worker.

use std::future::Future;
use std::time::Duration;

use tokio::sync::broadcast;

/// Shutdown signal sender.
pub type ShutdownTx = broadcast::Sender<()>;

/// Shutdown signal receiver.
pub type ShutdownRx = broadcast::Receiver<()>;

/// Create a shutdown channel.
pub fn shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    broadcast::channel(1)
}

/// A latching view of the shutdown channel.
///
/// Once the signal has been seen (or every sender is gone) the guard stays
/// triggered, so a worker can keep asking after the message was consumed.
#[derive(Debug)]
pub struct ShutdownGuard {
    rx: ShutdownRx,
    triggered: bool,
}

impl ShutdownGuard {
    /// Create a new shutdown guard from a sender.
    pub fn new(tx: &ShutdownTx) -> Self {
        Self {
            rx: tx.subscribe(),
            triggered: false,
        }
    }

    /// Wait for the shutdown signal.
    pub async fn wait(&mut self) {
        if !self.triggered {
            let _ = self.rx.recv().await;
            self.triggered = true;
        }
    }

    /// Check if shutdown has been signaled (non-blocking).
    pub fn is_shutdown(&mut self) -> bool {
        if !self.triggered {
            self.triggered = matches!(
                self.rx.try_recv(),
                Ok(_)
                    | Err(broadcast::error::TryRecvError::Closed)
                    | Err(broadcast::error::TryRecvError::Lagged(_))
            );
        }
        self.triggered
    }

    /// Drive `fut` to completion unless shutdown arrives first.
    ///
    /// Returns `None` when shutdown won; `fut` is dropped in that case.
    pub async fn guard<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        if self.triggered {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.rx.recv() => {
                self.triggered = true;
                None
            }
            out = fut => Some(out),
        }
    }

    /// Sleep for `duration`. Returns `false` if shutdown cut the sleep short.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        self.guard(tokio::time::sleep(duration)).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_channel() {
        let (tx, _rx) = shutdown_channel();
        let mut guard = ShutdownGuard::new(&tx);

        assert!(!guard.is_shutdown());

        tx.send(()).unwrap();

        // After sending, the guard should detect shutdown and keep reporting it
        assert!(guard.is_shutdown());
        assert!(guard.is_shutdown());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_interrupted_by_shutdown() {
        let (tx, _rx) = shutdown_channel();
        let mut guard = ShutdownGuard::new(&tx);

        let sleeper = tokio::spawn(async move {
            let finished = guard.sleep(Duration::from_secs(3600)).await;
            (finished, guard.guard(async { 1 }).await)
        });
        tokio::task::yield_now().await;
        tx.send(()).unwrap();

        let (finished, after) = sleeper.await.unwrap();
        assert!(!finished);
        assert_eq!(after, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_passes_through_output() {
        let (tx, _rx) = shutdown_channel();
        let mut guard = ShutdownGuard::new(&tx);
        assert_eq!(guard.guard(async { 7 }).await, Some(7));
        assert!(guard.sleep(Duration::from_millis(5)).await);
    }

    #[tokio::test]
    async fn test_dropped_sender_counts_as_shutdown() {
        let (tx, rx) = shutdown_channel();
        let mut guard = ShutdownGuard::new(&tx);
        drop(rx);
        drop(tx);
        guard.wait().await;
        assert!(guard.is_shutdown());
    }
}
