//! Queue item types (internal implementation).
//!
//! For API responses, use the DTO types from `vidgrab_core::download::queue`.

use std::time::Instant;

use vidgrab_core::download::{DownloadRequest, TaskId};

/// A request waiting to be dispatched.
#[derive(Clone, Debug)]
pub struct QueuedItem {
    /// Id assigned at enqueue time.
    pub id: TaskId,
    /// The request, owned by the queue until dispatch.
    pub request: DownloadRequest,
    /// When this item was queued (for ordering/debugging).
    pub queued_at: Instant,
}

impl QueuedItem {
    /// Wrap a request with a freshly minted id.
    pub fn new(request: DownloadRequest) -> Self {
        Self {
            id: TaskId::generate(),
            request,
            queued_at: Instant::now(),
        }
    }
}
