//! Timer port: one single-shot, rearmable timer per controller.

use std::time::Duration;

/// A single-shot timer. Arming replaces any pending arming.
pub trait Timer {
    fn arm(&self, after: Duration);

    fn disarm(&self);

    /// Claim the expiry being handled.
    ///
    /// Returns `false` when no expiry is outstanding, e.g. because a later
    /// [`arm`](Self::arm) or [`disarm`](Self::disarm) superseded the one
    /// that published the event.
    fn claim_expiry(&self) -> bool;
}

impl<T: Timer> Timer for std::sync::Arc<T> {
    fn arm(&self, after: Duration) {
        (**self).arm(after);
    }

    fn disarm(&self) {
        (**self).disarm();
    }

    fn claim_expiry(&self) -> bool {
        (**self).claim_expiry()
    }
}
