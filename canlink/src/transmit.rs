//! Transmit path

use core::future::poll_fn;
use core::task::{Context, Poll};

use crate::backend::{LinkBackend, SendStatus};
use crate::frame::CanFrame;
use crate::indicator::{Activity, Indicator};
use crate::status::{Acquire, TransmitState};
use crate::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError {
    /// Every attempt found the link busy or timed out. The link stays usable.
    RetriesExhausted,
    /// The backend reported a hard error. Transmission is blocked from now on.
    LinkFault,
    /// Transmission was blocked before the request could be served
    Blocked,
}

impl TransmitError {
    /// Whether the link refuses further transmission
    pub fn is_fatal(self) -> bool {
        !matches!(self, TransmitError::RetriesExhausted)
    }
}

pub(crate) trait DynamicTransmit {
    fn try_acquire(&self) -> Acquire;
    fn poll_acquire(&self, cx: &mut Context<'_>) -> Poll<Result<(), TransmitError>>;
    /// Runs the attempt loop on an acquired link and releases it.
    fn send_acquired(&self, frame: &CanFrame, retries: u8) -> Result<(), TransmitError>;
    fn signal_waiting(&self);
    fn status(&self) -> TransmitState;
}

/// Transmit handle
///
/// The link serves one frame at a time. Callers contend for it and never interleave at the
/// backend.
#[derive(Clone, Copy)]
pub struct Transmitter<'a>(&'a (dyn DynamicTransmit + Sync));

impl<'a> Transmitter<'a> {
    pub(crate) fn new(link: &'a (dyn DynamicTransmit + Sync)) -> Self {
        Self(link)
    }

    /// Sends a frame, making at most `1 + retries` attempts.
    ///
    /// Spins while another caller owns the link. Do not call from a context that can preempt
    /// the owner.
    pub fn transmit(&self, frame: &CanFrame, retries: u8) -> Result<(), TransmitError> {
        let mut waiting = false;
        loop {
            match self.0.try_acquire() {
                Acquire::Acquired => break,
                Acquire::Blocked => return Err(TransmitError::Blocked),
                Acquire::Wait => {
                    if !waiting {
                        waiting = true;
                        self.0.signal_waiting();
                    }
                    core::hint::spin_loop();
                }
            }
        }
        self.0.send_acquired(frame, retries)
    }

    /// Sends a frame, suspending while another caller owns the link.
    ///
    /// Attempts themselves are synchronous, so dropping the future never leaves the link busy.
    pub async fn transmit_async(&self, frame: &CanFrame, retries: u8) -> Result<(), TransmitError> {
        poll_fn(|cx| self.0.poll_acquire(cx)).await?;
        self.0.send_acquired(frame, retries)
    }

    pub fn status(&self) -> TransmitState {
        self.0.status()
    }
}

/// Attempt loop
///
/// Busy and timeout reports are retried. A hard error ends the loop at once.
pub(crate) fn send_with_retries<B, I>(
    backend: &B,
    indicator: &I,
    frame: &CanFrame,
    retries: u8,
    timeout: Duration,
) -> Result<(), TransmitError>
where
    B: LinkBackend + ?Sized,
    I: Indicator + ?Sized,
{
    let mut attempts: u16 = 0;
    loop {
        attempts += 1;
        match backend.send_frame(frame, timeout) {
            SendStatus::Sent => {
                indicator.signal(Activity::Transmitted);
                return Ok(());
            }
            SendStatus::Busy | SendStatus::Timeout => {
                if attempts > u16::from(retries) {
                    warn!("transmit: no success after {} attempts", attempts);
                    return Err(TransmitError::RetriesExhausted);
                }
                debug!("transmit: attempt {} failed, retrying", attempts);
                indicator.signal(Activity::Retrying);
            }
            SendStatus::HardError => {
                error!("transmit: hard error on attempt {}", attempts);
                return Err(TransmitError::LinkFault);
            }
        }
    }
}
