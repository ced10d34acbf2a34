//! Download event emitter port.
//!
//! This port abstracts event emission, allowing the scheduler and its
//! workers to publish events without coupling to the transport (channel,
//! terminal, test recorder).

use crate::download::DownloadEvent;

/// Port for emitting download events.
///
/// Implementations must not block: workers call this from inside progress
/// callbacks.
pub trait DownloadEventEmitterPort: Send + Sync {
    /// Emit a download event.
    fn emit(&self, event: DownloadEvent);

    /// Clone this emitter into a boxed trait object.
    fn clone_box(&self) -> Box<dyn DownloadEventEmitterPort>;
}
