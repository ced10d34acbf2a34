//! Event channel between workers and the UI poll loop.
//!
//! Unbounded: the UI drains faster than network-bound workers produce, and
//! `publish` must never block a worker.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};

use vidgrab_core::download::DownloadEvent;
use vidgrab_core::ports::DownloadEventEmitterPort;

/// Producer half. Cheap to clone; one clone per worker.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    tx: UnboundedSender<DownloadEvent>,
}

/// Consumer half, owned by the UI poll loop.
#[derive(Debug)]
pub struct ProgressReceiver {
    rx: UnboundedReceiver<DownloadEvent>,
}

impl ProgressReporter {
    /// Create a connected reporter/receiver pair.
    pub fn channel() -> (Self, ProgressReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, ProgressReceiver { rx })
    }

    /// Publish an event without blocking. Events published after the
    /// receiver is gone are discarded.
    pub fn publish(&self, event: DownloadEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Progress receiver closed; dropping event");
        }
    }
}

impl DownloadEventEmitterPort for ProgressReporter {
    fn emit(&self, event: DownloadEvent) {
        self.publish(event);
    }

    fn clone_box(&self) -> Box<dyn DownloadEventEmitterPort> {
        Box::new(self.clone())
    }
}

impl ProgressReceiver {
    /// Take every event available right now, in FIFO order. Never waits.
    pub fn drain(&mut self) -> Vec<DownloadEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    /// Whether every reporter has been dropped.
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }
}
