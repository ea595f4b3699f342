//! Cooperative cancellation.
//!
//! One [`StopToken`] is shared by everything a running script owns. Every
//! wait in the engine goes through it, so a stop request aborts all pending
//! sleeps promptly; in-flight background computations are cancelled
//! best-effort and their results discarded. The signal surfaces as the
//! dedicated [`Error::Stopped`] variant rather than an unwind.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use crate::error::{Error, Result};

/// Cloneable handle to the shared stop flag.
#[derive(Debug, Clone)]
pub struct StopToken {
    tx: Arc<watch::Sender<bool>>,
}

impl StopToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests a stop. All current and future waits on any clone of this
    /// token return [`Error::Stopped`].
    pub fn request_stop(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Fast-path check for loop tops and entry points.
    pub fn check(&self) -> Result<()> {
        if self.is_stopped() {
            Err(Error::Stopped)
        } else {
            Ok(())
        }
    }

    /// Sleeps for `duration`, aborting early with [`Error::Stopped`] if the
    /// stop signal arrives first.
    pub async fn wait(&self, duration: Duration) -> Result<()> {
        self.check()?;
        let mut rx = self.tx.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(duration) => Ok(()),
            _ = rx.wait_for(|stopped| *stopped) => Err(Error::Stopped),
        }
    }

    pub async fn wait_millis(&self, ms: u64) -> Result<()> {
        self.wait(Duration::from_millis(ms)).await
    }

    /// Sleeps a uniformly random duration in `min..=max` milliseconds.
    pub async fn wait_random_millis(&self, min: u64, max: u64) -> Result<()> {
        let ms = rand::thread_rng().gen_range(min..=max);
        self.wait_millis(ms).await
    }
}

impl Default for StopToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_completes_when_not_stopped() {
        let stop = StopToken::new();
        assert!(stop.wait_millis(50).await.is_ok());
    }

    #[tokio::test]
    async fn test_stop_aborts_pending_wait() {
        let stop = StopToken::new();
        let waiter = stop.clone();
        let handle = tokio::spawn(async move { waiter.wait(Duration::from_secs(3600)).await });
        tokio::task::yield_now().await;
        stop.request_stop();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(Error::Stopped)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_token_fails_immediately() {
        let stop = StopToken::new();
        stop.request_stop();
        assert!(matches!(stop.check(), Err(Error::Stopped)));
        assert!(matches!(
            stop.wait_millis(10).await,
            Err(Error::Stopped)
        ));
    }
}
