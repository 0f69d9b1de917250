//! The controller's view of the timer.

use std::time::Duration;

/// A single-slot timeout the controller arms while it searches.
///
/// When an armed timeout elapses, the implementation must set the timeout bit
/// of the [`SearchControl`](tessera_engine::SearchControl) the controller was
/// given.
pub trait Deadline {
    /// Schedule the single timeout `after` from now, replacing any pending
    /// one. A zero duration never fires.
    fn arm(&mut self, after: Duration);

    /// Cancel the pending timeout, if any.
    fn clear(&mut self);
}

/// A deadline that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeadline;

impl Deadline for NoDeadline {
    fn arm(&mut self, _after: Duration) {}

    fn clear(&mut self) {}
}

impl<D: Deadline + ?Sized> Deadline for &mut D {
    fn arm(&mut self, after: Duration) {
        (**self).arm(after);
    }

    fn clear(&mut self) {
        (**self).clear();
    }
}
