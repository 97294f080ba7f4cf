//! Link lockout
//!
//! Any fatal condition locks both paths at once: transmission becomes `Blocked` and reception
//! enters `Error`. There is no way back short of constructing a new link.

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::backend::{BackendError, LinkBackend};
use crate::indicator::{Activity, Indicator};
use crate::link::Link;

/// Reason the link was locked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultCause {
    /// The backend reported a bus-level error
    LinkError,
    /// Peripheral initialization failed
    InitFailed,
    /// Filter programming failed
    FilterFailed,
    /// Receive arming failed
    ArmFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterError {
    /// The link is locked; the filter was not forwarded
    LinkFault,
    /// The backend rejected the filter. The link is locked now.
    Backend(BackendError),
}

impl<M: RawMutex, B: LinkBackend, I: Indicator> Link<M, B, I> {
    /// Locks the link. Only the first cause is recorded.
    pub(crate) fn lock_link(&self, cause: FaultCause) {
        let first = self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            let first = state.status.lock(cause);
            state.tx_trigger.wake();
            first
        });

        if cause == FaultCause::LinkError {
            self.indicator.signal(Activity::LinkError);
        }
        if first {
            error!("link locked: {:?}", cause);
            self.indicator.signal(Activity::Fatal);
        }
    }
}
