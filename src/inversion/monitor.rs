//! Progress reporting and cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Collaborator polled by the inversion at window boundaries.
///
/// `is_cancelled` is checked once before each window's solve; progress is
/// reported at most once per window, never decreasing, and stays below 100
/// until the final result is assembled.
pub trait InversionMonitor {
    /// Whether the caller asked to stop.
    fn is_cancelled(&self) -> bool {
        false
    }

    /// Completion percentage, 0..=100.
    fn report_progress(&self, _percent: u8) {}
}

/// Monitor that never cancels and ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl InversionMonitor for NoopMonitor {}

/// Shareable cancellation flag for running the inversion on a worker thread.
///
/// # Example
///
/// ```
/// use seismic_core::{CancellationToken, InversionMonitor};
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an un-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; observed at the next window boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl InversionMonitor for CancellationToken {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
