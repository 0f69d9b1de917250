//! The shared abort flag of a running search.

use std::sync::atomic::{AtomicU8, Ordering};

const STOP: u8 = 0b01;
const TIMEOUT: u8 = 0b10;

/// The abort flag shared by the input reader, the timer and the search.
///
/// Polled by the engine at every node. Two bits are kept so the controller
/// can tell an operator `stop` (final for this `go`) from a deadline that it
/// armed itself and may re-arm:
/// - **stop**: set by the input reader on `stop` or `quit`
/// - **timeout**: set by the timer thread when the armed deadline elapses
///
/// A search is aborted when either bit is set.
#[derive(Debug, Default)]
pub struct SearchControl {
    flags: AtomicU8,
}

impl SearchControl {
    /// Create a control with no bit set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the running search stop (`stop` command).
    pub fn request_stop(&self) {
        self.flags.fetch_or(STOP, Ordering::AcqRel);
    }

    /// Forget a previous stop request; done when a new `go` arrives.
    pub fn clear_stop(&self) {
        self.flags.fetch_and(!STOP, Ordering::AcqRel);
    }

    /// Signal that the armed deadline has elapsed.
    pub fn signal_timeout(&self) {
        self.flags.fetch_or(TIMEOUT, Ordering::AcqRel);
    }

    /// Forget a previous timeout.
    pub fn clear_timeout(&self) {
        self.flags.fetch_and(!TIMEOUT, Ordering::AcqRel);
    }

    /// Whether the running search should unwind now.
    pub fn is_aborted(&self) -> bool {
        self.flags.load(Ordering::Relaxed) != 0
    }

    /// Whether a `stop` has been requested.
    pub fn stop_requested(&self) -> bool {
        self.flags.load(Ordering::Acquire) & STOP != 0
    }

    /// Whether the deadline has elapsed.
    pub fn timed_out(&self) -> bool {
        self.flags.load(Ordering::Acquire) & TIMEOUT != 0
    }
}
