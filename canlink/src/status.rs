//! Transmit and receive lifecycle states
//!
//! [`Status`] holds both state machines and exposes only guarded transitions. The link keeps it
//! behind a single mutex, so every transition is atomic with respect to the interrupt-context
//! fault path.

use crate::fault::FaultCause;
use crate::receive::{DISCARD, FrameHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitState {
    /// Ready to send a frame
    Ready,
    /// A frame is being sent; other requests wait
    Busy,
    /// A fatal error occurred; all transmit requests are refused. Terminal.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiveState {
    /// No handler installed; frames are dropped
    Stopped,
    /// Handler kept but not called; reception lapses until unpaused
    Paused,
    /// Handler called for every received frame
    Started,
    /// The link was locked; the handler is reset and never called again. Terminal.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Acquire {
    Acquired,
    Wait,
    Blocked,
}

/// Outcome of a guarded receive transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum Transition {
    /// The guard rejected the transition; nothing changed
    Ignored,
    Applied,
    /// Applied; the caller must arm the backend
    Arm,
}

pub(crate) struct Status {
    transmit: TransmitState,
    receive: ReceiveState,
    handler: &'static dyn FrameHandler,
    // A reception is armed at the backend and not yet delivered
    armed: bool,
    fault: Option<FaultCause>,
}

impl Status {
    pub fn new() -> Self {
        Self {
            transmit: TransmitState::Ready,
            receive: ReceiveState::Stopped,
            handler: DISCARD,
            armed: false,
            fault: None,
        }
    }

    pub fn transmit(&self) -> TransmitState {
        self.transmit
    }

    pub fn receive(&self) -> ReceiveState {
        self.receive
    }

    pub fn fault(&self) -> Option<FaultCause> {
        self.fault
    }

    pub fn try_acquire(&mut self) -> Acquire {
        match self.transmit {
            TransmitState::Ready => {
                self.transmit = TransmitState::Busy;
                Acquire::Acquired
            }
            TransmitState::Busy => Acquire::Wait,
            TransmitState::Blocked => Acquire::Blocked,
        }
    }

    /// Busy -> Ready. A concurrent fault wins.
    pub fn release(&mut self) {
        if self.transmit == TransmitState::Busy {
            self.transmit = TransmitState::Ready;
        }
    }

    pub fn block_transmit(&mut self) {
        self.transmit = TransmitState::Blocked;
    }

    pub fn start(&mut self, handler: &'static dyn FrameHandler) -> Transition {
        if self.stop() == Transition::Ignored {
            return Transition::Ignored;
        }
        self.handler = handler;
        self.receive = ReceiveState::Started;
        self.arm_if_idle()
    }

    pub fn pause(&mut self) -> Transition {
        if self.receive != ReceiveState::Started {
            return Transition::Ignored;
        }
        self.receive = ReceiveState::Paused;
        Transition::Applied
    }

    pub fn unpause(&mut self) -> Transition {
        if self.receive != ReceiveState::Paused {
            return Transition::Ignored;
        }
        self.receive = ReceiveState::Started;
        self.arm_if_idle()
    }

    pub fn stop(&mut self) -> Transition {
        if self.receive == ReceiveState::Error {
            return Transition::Ignored;
        }
        self.handler = DISCARD;
        self.receive = ReceiveState::Stopped;
        Transition::Applied
    }

    /// Consumes the armed reception. Returns the handler to call, if any.
    pub fn take_delivery(&mut self) -> Option<&'static dyn FrameHandler> {
        self.armed = false;
        match self.receive {
            ReceiveState::Started => Some(self.handler),
            _ => None,
        }
    }

    /// Re-arms after a delivery unless reception was paused, stopped or already re-armed.
    pub fn rearm(&mut self) -> Transition {
        if self.receive != ReceiveState::Started {
            return Transition::Ignored;
        }
        self.arm_if_idle()
    }

    /// Locks both state machines. Returns `true` on the first fault.
    pub fn lock(&mut self, cause: FaultCause) -> bool {
        self.transmit = TransmitState::Blocked;
        self.receive = ReceiveState::Error;
        self.handler = DISCARD;
        if self.fault.is_none() {
            self.fault = Some(cause);
            true
        } else {
            false
        }
    }

    fn arm_if_idle(&mut self) -> Transition {
        if self.armed {
            Transition::Applied
        } else {
            self.armed = true;
            Transition::Arm
        }
    }
}
