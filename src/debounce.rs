//! Delayed, replaceable tasks.
//!
//! Each [`Debouncer::schedule`] call cancels the task scheduled before it, so
//! a burst of calls runs only the last task, once the delay has passed
//! without a newer call. A task that has already started is left alone.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tracing::trace;

pub struct Debouncer {
    delay: Duration,
    pending: Option<watch::Sender<bool>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let delay = self.delay;
        tokio::spawn(async move {
            let fire = tokio::select! {
                _ = cancel_rx.wait_for(|cancelled| *cancelled) => false,
                _ = tokio::time::sleep(delay) => true,
            };
            if fire {
                task.await;
            } else {
                trace!("Superseded before the delay elapsed");
            }
        });
        self.pending = Some(cancel_tx);
    }

    /// Drops the pending task, if it has not started yet.
    pub fn cancel(&mut self) {
        if let Some(existing) = self.pending.take() {
            let _ = existing.send(true);
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
