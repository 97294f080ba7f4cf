//! In-memory backend that receives its own transmissions
//!
//! Useful for host tests and for bring-up without a transceiver. The backend mimics a bxCAN
//! peripheral in loop-back mode: transmitted frames pass the acceptance filters into a 3-frame
//! receive FIFO, and the application drives [`Loopback::dispatch`] in place of the receive
//! interrupt.

use core::cell::RefCell;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use heapless::Deque;

use crate::backend::{BackendError, LinkBackend, SendStatus};
use crate::events::Events;
use crate::filter::{Filter, FilterBank};
use crate::frame::CanFrame;
use crate::time::Duration;

/// Receive FIFO depth
pub const RX_FIFO_DEPTH: usize = 3;

pub struct Loopback {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner>>,
}

struct Inner {
    initialized: bool,
    filters: [Option<Filter>; FilterBank::COUNT],
    rx_fifo: Deque<CanFrame, RX_FIFO_DEPTH>,
    armed: bool,
    pending_tx_complete: u32,
    overruns: u32,
}

impl Loopback {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                initialized: false,
                filters: [None; FilterBank::COUNT],
                rx_fifo: Deque::new(),
                armed: false,
                pending_tx_complete: 0,
                overruns: 0,
            })),
        }
    }

    /// Runs the interrupt work.
    ///
    /// Reports pending transmit completions, then delivers at most one queued frame if a
    /// reception is armed. Returns `true` if a frame was delivered.
    pub fn dispatch(&self, events: Events<'_>) -> bool {
        let (completions, frame) = self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            let completions = core::mem::take(&mut inner.pending_tx_complete);
            let frame = if inner.armed {
                let frame = inner.rx_fifo.pop_front();
                if frame.is_some() {
                    inner.armed = false;
                }
                frame
            } else {
                None
            };
            (completions, frame)
        });

        for _ in 0..completions {
            events.transmit_complete();
        }

        // The lock is released: the core re-arms from inside the notification
        if let Some(frame) = frame {
            events.frame_received(&frame);
            true
        } else {
            false
        }
    }

    /// Number of frames waiting in the receive FIFO
    pub fn pending(&self) -> usize {
        self.inner.lock(|cell| cell.borrow().rx_fifo.len())
    }

    /// Number of accepted frames dropped on a full receive FIFO
    pub fn overruns(&self) -> u32 {
        self.inner.lock(|cell| cell.borrow().overruns)
    }

    pub fn is_armed(&self) -> bool {
        self.inner.lock(|cell| cell.borrow().armed)
    }

    pub fn filter(&self, bank: FilterBank) -> Option<Filter> {
        self.inner
            .lock(|cell| cell.borrow().filters[usize::from(bank)])
    }
}

impl Default for Loopback {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    fn accepts(&self, frame: &CanFrame) -> bool {
        self.filters
            .iter()
            .flatten()
            .any(|filter| filter.accepts(frame))
    }
}

impl LinkBackend for Loopback {
    fn init_link(&mut self, filter: Option<Filter>) -> Result<(), BackendError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            inner.initialized = true;
            inner.filters = [None; FilterBank::COUNT];
            inner.rx_fifo.clear();
            inner.armed = false;
            if let Some(filter) = filter {
                inner.filters[usize::from(filter.bank)] = Some(filter);
            }
        });
        trace!("loopback: initialized");
        Ok(())
    }

    fn configure_filter(&self, filter: Filter) -> Result<(), BackendError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            if !inner.initialized {
                return Err(BackendError::NotInitialized);
            }
            inner.filters[usize::from(filter.bank)] = Some(filter);
            Ok(())
        })
    }

    fn send_frame(&self, frame: &CanFrame, _timeout: Duration) -> SendStatus {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            if !inner.initialized {
                return SendStatus::HardError;
            }
            if inner.accepts(frame) && inner.rx_fifo.push_back(*frame).is_err() {
                inner.overruns += 1;
                debug!("loopback: receive FIFO overrun");
            }
            inner.pending_tx_complete += 1;
            SendStatus::Sent
        })
    }

    fn arm_receive(&self) -> Result<(), BackendError> {
        self.inner.lock(|cell| {
            let mut inner = cell.borrow_mut();
            if !inner.initialized {
                return Err(BackendError::NotInitialized);
            }
            if inner.armed {
                return Err(BackendError::AlreadyArmed);
            }
            inner.armed = true;
            Ok(())
        })
    }
}
