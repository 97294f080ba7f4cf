//! Receive control
//!
//! Reception is single-shot at the backend: every armed reception delivers one frame. While
//! reception is started, the link re-arms after each delivery.

use crate::frame::CanFrame;
use crate::status::ReceiveState;

/// Receive handler
///
/// The handler runs in the context that reports received frames, usually the receive
/// interrupt. It must be short and must not block on the transmit path.
pub trait FrameHandler: Sync {
    fn on_frame(&self, frame: &CanFrame);
}

impl<F> FrameHandler for F
where
    F: Fn(&CanFrame) + Sync,
{
    fn on_frame(&self, frame: &CanFrame) {
        self(frame)
    }
}

/// Handler that drops every frame
pub fn discard(_frame: &CanFrame) {}

pub(crate) const DISCARD: &dyn FrameHandler = &discard;

pub(crate) trait DynamicReceive {
    fn start(&self, handler: &'static dyn FrameHandler);
    fn pause(&self);
    fn unpause(&self);
    fn stop(&self);
    fn status(&self) -> ReceiveState;
}

/// Receive control handle
///
/// Calls that are not allowed in the current state are ignored. In particular, nothing changes
/// once the link is locked.
#[derive(Clone, Copy)]
pub struct Receiver<'a>(&'a (dyn DynamicReceive + Sync));

impl<'a> Receiver<'a> {
    pub(crate) fn new(link: &'a (dyn DynamicReceive + Sync)) -> Self {
        Self(link)
    }

    /// Installs the handler and starts reception.
    ///
    /// Starting while reception is already started replaces the handler. The backend is armed
    /// only if no reception is outstanding. A delivery already running in another context
    /// finishes with the previous handler.
    pub fn start(&self, handler: &'static dyn FrameHandler) {
        self.0.start(handler)
    }

    /// Started -> Paused. Frames arriving while paused are dropped.
    pub fn pause(&self) {
        self.0.pause()
    }

    /// Paused -> Started. Only frames arriving afterwards reach the handler.
    pub fn unpause(&self) {
        self.0.unpause()
    }

    /// Resets the handler and stops reception.
    ///
    /// The handler runs outside the link lock. A delivery that took the handler before this call
    /// may still be running when it returns, so the handler must tolerate that one last call.
    /// No delivery starts with it afterwards.
    pub fn stop(&self) {
        self.0.stop()
    }

    pub fn status(&self) -> ReceiveState {
        self.0.status()
    }
}
