use core::cell::RefCell;
use core::task::{Context, Poll};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::waitqueue::WakerRegistration;

use crate::backend::LinkBackend;
use crate::config::Config;
use crate::events::Events;
use crate::fault::{FaultCause, FilterError};
use crate::filter::Filter;
use crate::frame::CanFrame;
use crate::indicator::{Activity, Indicator, NoIndicator};
use crate::internal::DynamicEvents;
use crate::receive::{DynamicReceive, FrameHandler, Receiver};
use crate::status::{Acquire, ReceiveState, Status, Transition, TransmitState};
use crate::transmit::{DynamicTransmit, TransmitError, Transmitter, send_with_retries};

/// CAN link bound to a single peripheral
///
/// Owns the backend and the shared transmit and receive state. Application code uses the
/// [`Transmitter`] and [`Receiver`] handles; the backend reports through [`Events`].
///
/// The mutex type must be usable from the context the backend notifies from. Use
/// `CriticalSectionRawMutex` when notifications come from interrupts.
pub struct Link<M: RawMutex, B: LinkBackend, I: Indicator = NoIndicator> {
    backend: B,
    pub(crate) indicator: I,
    pub(crate) state: Mutex<M, RefCell<State>>,
    config: Config,
}

pub(crate) struct State {
    pub status: Status,
    // Transmit waiters; woken on release and on lockout
    pub tx_trigger: WakerRegistration,
}

impl<M: RawMutex, B: LinkBackend> Link<M, B> {
    /// Initializes the backend and creates the link.
    ///
    /// If initialization fails, the link is created locked.
    pub fn new(backend: B, config: Config) -> Self {
        Self::with_indicator(backend, NoIndicator, config)
    }
}

impl<M: RawMutex, B: LinkBackend, I: Indicator> Link<M, B, I> {
    pub fn with_indicator(mut backend: B, indicator: I, config: Config) -> Self {
        let mut status = Status::new();
        let filter = config.initial_filter.map(|filter| filter.into_filter());
        match backend.init_link(filter) {
            Ok(()) => trace!("link initialized"),
            Err(err) => {
                error!("link initialization failed: {:?}", err);
                status.lock(FaultCause::InitFailed);
                indicator.signal(Activity::Fatal);
            }
        }

        Self {
            backend,
            indicator,
            state: Mutex::new(RefCell::new(State {
                status,
                tx_trigger: WakerRegistration::new(),
            })),
            config,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transmit_status(&self) -> TransmitState {
        self.state.lock(|cell| cell.borrow().status.transmit())
    }

    pub fn receive_status(&self) -> ReceiveState {
        self.state.lock(|cell| cell.borrow().status.receive())
    }

    /// Reason the link was locked, if it was
    pub fn fault(&self) -> Option<FaultCause> {
        self.state.lock(|cell| cell.borrow().status.fault())
    }

    /// Programs an acceptance filter bank.
    ///
    /// A backend failure locks the link. The backend call is made outside the link lock, so a
    /// link error raised while it runs cannot stop this one filter from being programmed. The
    /// call then reports [`FilterError::LinkFault`] all the same.
    pub fn configure_filter(&self, filter: Filter) -> Result<(), FilterError> {
        if self.fault().is_some() {
            return Err(FilterError::LinkFault);
        }
        match self.backend.configure_filter(filter) {
            Ok(()) if self.fault().is_some() => {
                warn!("filter bank {} programmed during lockout", filter.bank.number());
                Err(FilterError::LinkFault)
            }
            Ok(()) => {
                trace!("filter bank {} configured", filter.bank.number());
                Ok(())
            }
            Err(err) => {
                error!("filter bank {} rejected: {:?}", filter.bank.number(), err);
                self.lock_link(FaultCause::FilterFailed);
                Err(FilterError::Backend(err))
            }
        }
    }

    fn arm(&self) {
        match self.backend.arm_receive() {
            Ok(()) => trace!("receive armed"),
            Err(err) => {
                error!("receive arming failed: {:?}", err);
                self.lock_link(FaultCause::ArmFailed);
            }
        }
    }

    fn update_receive(&self, name: &str, f: impl FnOnce(&mut Status) -> Transition) {
        let transition = self.state.lock(|cell| f(&mut cell.borrow_mut().status));
        trace!("receive {}: {:?}", name, transition);
        if transition == Transition::Arm {
            self.arm();
        }
    }
}

impl<M: RawMutex + Sync, B: LinkBackend, I: Indicator> Link<M, B, I> {
    pub fn transmitter(&self) -> Transmitter<'_> {
        Transmitter::new(self)
    }

    pub fn receiver(&self) -> Receiver<'_> {
        Receiver::new(self)
    }

    /// Notification handle for the backend
    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }

    pub fn split(&self) -> (Transmitter<'_>, Receiver<'_>, Events<'_>) {
        (self.transmitter(), self.receiver(), self.events())
    }

    /// Sends the self-test frame (extended id 0, payload `TesTTesT`).
    pub fn send_test(&self) -> Result<(), TransmitError> {
        self.transmitter()
            .transmit(&CanFrame::test_pattern(), self.config.test_retries)
    }
}

impl<M: RawMutex, B: LinkBackend, I: Indicator> DynamicTransmit for Link<M, B, I> {
    fn try_acquire(&self) -> Acquire {
        self.state
            .lock(|cell| cell.borrow_mut().status.try_acquire())
    }

    fn poll_acquire(&self, cx: &mut Context<'_>) -> Poll<Result<(), TransmitError>> {
        let poll = self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            match state.status.try_acquire() {
                Acquire::Acquired => Poll::Ready(Ok(())),
                Acquire::Blocked => Poll::Ready(Err(TransmitError::Blocked)),
                Acquire::Wait => {
                    state.tx_trigger.register(cx.waker());
                    Poll::Pending
                }
            }
        });
        if poll.is_pending() {
            self.indicator.signal(Activity::Waiting);
        }
        poll
    }

    fn send_acquired(&self, frame: &CanFrame, retries: u8) -> Result<(), TransmitError> {
        let result = send_with_retries(
            &self.backend,
            &self.indicator,
            frame,
            retries,
            self.config.tx_timeout,
        );

        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            match result {
                Err(TransmitError::LinkFault) => state.status.block_transmit(),
                _ => state.status.release(),
            }
            state.tx_trigger.wake();
        });
        trace!("transmit finished: {:?}", result);
        result
    }

    fn signal_waiting(&self) {
        self.indicator.signal(Activity::Waiting);
    }

    fn status(&self) -> TransmitState {
        self.transmit_status()
    }
}

impl<M: RawMutex, B: LinkBackend, I: Indicator> DynamicReceive for Link<M, B, I> {
    fn start(&self, handler: &'static dyn FrameHandler) {
        self.update_receive("start", |status| status.start(handler));
    }

    fn pause(&self) {
        self.update_receive("pause", Status::pause);
    }

    fn unpause(&self) {
        self.update_receive("unpause", Status::unpause);
    }

    fn stop(&self) {
        self.update_receive("stop", Status::stop);
    }

    fn status(&self) -> ReceiveState {
        self.receive_status()
    }
}

impl<M: RawMutex, B: LinkBackend, I: Indicator> DynamicEvents for Link<M, B, I> {
    fn frame_received(&self, frame: &CanFrame) {
        let handler = self
            .state
            .lock(|cell| cell.borrow_mut().status.take_delivery());
        let Some(handler) = handler else {
            trace!("frame dropped");
            return;
        };

        self.indicator.signal(Activity::Received);
        // Not under the lock: the handler may control reception itself. A concurrent stop or
        // start only affects the next delivery.
        handler.on_frame(frame);

        self.update_receive("rearm", Status::rearm);
    }

    fn transmit_complete(&self) {
        self.indicator.signal(Activity::Transmitted);
    }

    fn link_error(&self) {
        self.lock_link(FaultCause::LinkError);
    }
}
