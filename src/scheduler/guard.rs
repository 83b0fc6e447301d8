//! Single-flight execution guard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// At most one holder at a time; a second `try_acquire` fails instead of
/// waiting.
#[derive(Debug, Default)]
pub struct ExecutionGuard {
    busy: AtomicBool,
}

impl ExecutionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard, or `None` if it is held.
    pub fn try_acquire(self: &Arc<Self>) -> Option<ExecutionPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ExecutionPermit(Arc::clone(self)))
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the guard when dropped.
/// Ensures release even if the task holding it is cancelled or panics.
pub struct ExecutionPermit(Arc<ExecutionGuard>);

impl Drop for ExecutionPermit {
    fn drop(&mut self) {
        self.0.busy.store(false, Ordering::Release);
    }
}
