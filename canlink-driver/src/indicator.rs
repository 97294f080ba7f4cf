//! Link activity indication
//!
//! Boards typically map activities to LEDs: a toggle per transmitted or received frame, per
//! link error and per waiting or retry round, and a steady pattern once the link is locked.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Activity {
    Transmitted,
    Received,
    LinkError,
    /// A transmit request waits for the link to become ready
    Waiting,
    /// A transmission attempt failed and will be repeated
    Retrying,
    /// The link has been locked
    Fatal,
}

/// Activity sink
///
/// Called from both thread and interrupt context; implementations must return quickly.
pub trait Indicator: Sync {
    fn signal(&self, activity: Activity);
}

impl<T: Indicator + ?Sized> Indicator for &T {
    fn signal(&self, activity: Activity) {
        T::signal(self, activity)
    }
}

/// Indicator that ignores all activity
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndicator;

impl Indicator for NoIndicator {
    fn signal(&self, _activity: Activity) {}
}
