//! Peripheral side of the link
//!
//! The backend owns the hardware: bit timing, pins, clocks, interrupt priorities and filter
//! registers. The core drives it through [`LinkBackend`] and receives the backend's
//! notifications through [`Events`](crate::events::Events).

use crate::filter::Filter;
use crate::frame::CanFrame;
use crate::time::Duration;

/// Result of a single transmission attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendStatus {
    /// The frame left the mailbox
    Sent,
    /// The link was occupied; the attempt may be repeated
    Busy,
    /// The attempt did not complete within the timeout; it may be repeated
    Timeout,
    /// The peripheral could not accept the frame (e.g. no free mailbox). The peripheral state
    /// should be considered corrupted.
    HardError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackendError {
    NotInitialized,
    InvalidFilter,
    /// A reception is already armed
    AlreadyArmed,
    /// Peripheral-specific failure
    Peripheral,
}

/// Low-level CAN peripheral access
///
/// All methods except `init_link` may be called from both thread and interrupt context.
/// Implementations synchronize their own register access.
///
/// A backend notifies the core through an [`Events`](crate::events::Events) handle:
/// * `frame_received` once per armed reception that passed the filters
/// * `transmit_complete` after a frame left the peripheral
/// * `link_error` on any bus-level error (bus-off, error passive, ...)
pub trait LinkBackend: Sync {
    /// One-time peripheral setup.
    ///
    /// Installs `filter` if provided. Without a filter, nothing will be received.
    fn init_link(&mut self, filter: Option<Filter>) -> Result<(), BackendError>;

    fn configure_filter(&self, filter: Filter) -> Result<(), BackendError>;

    /// Submits a frame and blocks until it was sent, rejected, or `timeout` elapsed.
    fn send_frame(&self, frame: &CanFrame, timeout: Duration) -> SendStatus;

    /// Arms exactly one reception.
    ///
    /// The core calls it again after each delivered frame to keep receiving.
    fn arm_receive(&self) -> Result<(), BackendError>;
}
