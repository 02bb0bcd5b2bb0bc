//! Cancellation and deadline signal for a run
//!
//! Every agent gets a clone of the same [`RunContext`]. Clones share the
//! cancellation flag, so cancelling one stops all of them at the top of their
//! next iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RunContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    /// A context that is never done unless cancelled
    pub fn background() -> Self {
        Self {
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::background()
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Ask every holder of this context to stop
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Cancelled, or past the deadline
    #[inline]
    pub fn is_done(&self) -> bool {
        self.is_cancelled() || self.deadline.map_or(false, |d| Instant::now() >= d)
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::background()
    }
}
