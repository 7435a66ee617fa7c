//! Deliberate process shutdown requests.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

/// Why the bot is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// `/restart`: exit so the process manager starts a fresh instance.
    Restart,
    /// `/shutdown`.
    Shutdown,
    /// Ctrl+C or SIGTERM.
    Signal,
    /// The bridge event stream ended.
    StreamClosed,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restart => write!(f, "restart command"),
            Self::Shutdown => write!(f, "shutdown command"),
            Self::Signal => write!(f, "signal"),
            Self::StreamClosed => write!(f, "event stream closed"),
        }
    }
}

/// Sends a shutdown request to the main loop after a fixed delay.
#[derive(Debug, Clone)]
pub struct ShutdownRequester {
    tx: mpsc::Sender<ShutdownReason>,
    delay: Duration,
}

impl ShutdownRequester {
    /// Creates a requester and the receiver the main loop listens on.
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::Receiver<ShutdownReason>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx, delay }, rx)
    }

    /// Requests shutdown once the delay has elapsed. Does not block.
    pub fn request_after_delay(&self, reason: ShutdownReason) {
        let tx = self.tx.clone();
        let delay = self.delay;

        debug!("Shutdown ({}) requested in {:?}", reason, delay);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(reason).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_request_arrives_after_delay() {
        let (requester, mut rx) = ShutdownRequester::new(Duration::from_secs(1));
        requester.request_after_delay(ShutdownReason::Restart);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        let reason = rx.recv().await;
        assert_eq!(reason, Some(ShutdownReason::Restart));
    }
}
