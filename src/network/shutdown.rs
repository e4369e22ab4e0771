//! Shutdown signal
//!
//! Cooperative cancellation shared by both connection loops and by callers
//! blocked in `submit`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-way cancellation flag; clones observe the same signal
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown; idempotent
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Release);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }
}
