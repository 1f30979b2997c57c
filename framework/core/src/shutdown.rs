use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::broadcast::{Receiver, Sender};
use tokio::sync::Mutex;

/// Broadcasts the stop signal for a run to every listener that was handed out.
///
/// The handle is cheap to clone and any clone may trigger the shutdown. There is exactly one
/// handle per run, created by the runner before any virtual users are started.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Sender<()>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: tokio::sync::broadcast::channel(1).0,
        }
    }

    pub fn shutdown(&self) {
        if let Err(e) = self.sender.send(()) {
            // Only fails when nobody is listening, so there is nothing left to stop.
            log::warn!("Failed to send shutdown signal: {e:?}");
        }
    }

    pub fn new_listener(&self) -> DelegatedShutdownListener {
        DelegatedShutdownListener::new(self.sender.subscribe())
    }
}

/// A listener for the run's stop signal.
///
/// Once the signal has been observed the listener latches, so repeated polls keep reporting that
/// the run is stopping even though the broadcast message was consumed by the first poll.
#[derive(Clone, Debug)]
pub struct DelegatedShutdownListener {
    receiver: Arc<Mutex<Receiver<()>>>,
    seen: Arc<AtomicBool>,
}

impl DelegatedShutdownListener {
    pub(crate) fn new(receiver: Receiver<()>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
            seen: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Point in time check for the shutdown signal. When this returns true the caller should stop
    /// its work so that the run can shut down.
    pub fn should_shutdown(&mut self) -> bool {
        if self.seen.load(Ordering::SeqCst) {
            return true;
        }

        let received = match self.receiver.try_lock() {
            Ok(mut guard) => match guard.try_recv() {
                Ok(_) => true,
                Err(TryRecvError::Closed) => true,
                // Empty or lagged, the signal has not been sent yet.
                Err(_) => false,
            },
            Err(_) => false,
        };

        if received {
            self.seen.store(true, Ordering::SeqCst);
        }

        received
    }

    /// Wait for the shutdown signal. Safe to race against another future so that the signal can
    /// cancel work in progress.
    pub async fn wait_for_shutdown(&mut self) {
        if self.seen.load(Ordering::SeqCst) {
            return;
        }

        // A closed channel means the handle is gone, which is as good as a shutdown.
        let _ = self.receiver.lock().await.recv().await;
        self.seen.store(true, Ordering::SeqCst);
    }
}

/// Signals that in-flight work was cancelled because the run is stopping.
///
/// The runner treats this error as expected when it comes out of an iteration hook during
/// shutdown, so it is not counted as a failure.
#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct ShutdownSignalError {
    msg: String,
}

impl Default for ShutdownSignalError {
    fn default() -> Self {
        Self {
            msg: "Execution cancelled by shutdown signal".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listener_latches_after_signal() {
        let handle = ShutdownHandle::new();
        let mut listener = handle.new_listener();

        assert!(!listener.should_shutdown());

        handle.shutdown();

        assert!(listener.should_shutdown());
        // The broadcast message was consumed above, the latch must still report it.
        assert!(listener.should_shutdown());
    }

    #[tokio::test]
    async fn listeners_are_independent() {
        let handle = ShutdownHandle::new();
        let mut first = handle.new_listener();
        let mut second = handle.new_listener();

        handle.shutdown();

        assert!(first.should_shutdown());
        assert!(second.should_shutdown());
    }

    #[tokio::test]
    async fn wait_returns_once_signalled() {
        let handle = ShutdownHandle::new();
        let mut listener = handle.new_listener();

        handle.shutdown();

        listener.wait_for_shutdown().await;
        assert!(listener.should_shutdown());
    }
}
