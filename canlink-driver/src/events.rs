//! Notifications raised by the backend

use crate::frame::CanFrame;
use crate::internal;

/// Inbound notification handle
///
/// Backends call these methods from the peripheral interrupt handlers. The handle is `Copy`,
/// so it can be stored in a `static` next to the interrupt binding.
#[derive(Clone, Copy)]
pub struct Events<'a>(&'a (dyn internal::DynamicEvents + Sync));

impl<'a> Events<'a> {
    pub fn new(access: &'a (dyn internal::DynamicEvents + Sync)) -> Self {
        Self(access)
    }

    /// Delivers a frame that passed the acceptance filters.
    ///
    /// The frame is borrowed for the duration of the call only. The reception counts as
    /// consumed: the backend must not deliver again until it is re-armed.
    pub fn frame_received(&self, frame: &CanFrame) {
        self.0.frame_received(frame);
    }

    /// Reports that a frame left the peripheral. Informational.
    pub fn transmit_complete(&self) {
        self.0.transmit_complete();
    }

    /// Reports a bus-level error. Locks the link permanently.
    pub fn link_error(&self) {
        self.0.link_error();
    }
}
