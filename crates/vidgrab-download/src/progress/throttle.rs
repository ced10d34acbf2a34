//! Progress throttling.
//!
//! Rate-limits progress ticks so a fast extractor cannot flood the channel.

use std::time::{Duration, Instant};

/// Rate-limiter for progress updates.
///
/// Ticks closer together than the configured interval are dropped, except a
/// completion tick (100%), which always passes.
#[derive(Debug)]
pub struct ProgressThrottle {
    last_emit: Option<Instant>,
    min_interval: Duration,
}

impl ProgressThrottle {
    /// Create a new throttle with the specified minimum interval.
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            last_emit: None,
            min_interval,
        }
    }

    /// Check if a tick at `percent` should be forwarded.
    pub fn should_emit(&mut self, percent: f32) -> bool {
        let now = Instant::now();
        let complete = percent >= 100.0;
        match self.last_emit {
            Some(last) if !complete && now.duration_since(last) < self.min_interval => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }
}
