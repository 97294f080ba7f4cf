#![allow(dead_code)]

use canlink::backend::{BackendError, LinkBackend, SendStatus};
use canlink::events::Events;
use canlink::filter::Filter;
use canlink::frame::CanFrame;
use canlink::indicator::{Activity, Indicator};
use canlink::receive::FrameHandler;
use canlink::time::Duration;
use embedded_can::StandardId;
use std::boxed::Box;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::vec::Vec;

pub fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

pub fn std_frame(id: u16, data: &[u8]) -> CanFrame {
    CanFrame::new_data(StandardId::new(id).unwrap(), data).unwrap()
}

/// Backend with scripted transmit outcomes and single-shot reception
pub struct Scripted {
    responses: Mutex<VecDeque<SendStatus>>,
    default_response: SendStatus,
    sent: Mutex<Vec<CanFrame>>,
    timeouts: Mutex<Vec<Duration>>,
    send_delay: std::time::Duration,
    in_flight: AtomicBool,
    overlaps: AtomicUsize,
    armed: AtomicBool,
    arms: AtomicUsize,
    fail_init: bool,
    fail_filter: AtomicBool,
    fail_arm: AtomicBool,
    init_filter: Mutex<Option<Option<Filter>>>,
    filters: Mutex<Vec<Filter>>,
    filter_link_error: Mutex<Option<Events<'static>>>,
}

impl Scripted {
    pub fn new(default_response: SendStatus) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default_response,
            sent: Mutex::new(Vec::new()),
            timeouts: Mutex::new(Vec::new()),
            send_delay: std::time::Duration::ZERO,
            in_flight: AtomicBool::new(false),
            overlaps: AtomicUsize::new(0),
            armed: AtomicBool::new(false),
            arms: AtomicUsize::new(0),
            fail_init: false,
            fail_filter: AtomicBool::new(false),
            fail_arm: AtomicBool::new(false),
            init_filter: Mutex::new(None),
            filters: Mutex::new(Vec::new()),
            filter_link_error: Mutex::new(None),
        }
    }

    /// Responses used before falling back to the default one
    pub fn with_responses(mut self, responses: &[SendStatus]) -> Self {
        self.responses = Mutex::new(responses.iter().copied().collect());
        self
    }

    pub fn with_send_delay(mut self, delay: std::time::Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn with_failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    pub fn fail_filter(&self) {
        self.fail_filter.store(true, Ordering::SeqCst);
    }

    /// Raises a link error while the next filter is being programmed
    pub fn link_error_on_filter(&self, events: Events<'static>) {
        *self.filter_link_error.lock().unwrap() = Some(events);
    }

    pub fn fail_arm(&self) {
        self.fail_arm.store(true, Ordering::SeqCst);
    }

    /// Frames handed to the peripheral, one entry per attempt
    pub fn sent(&self) -> Vec<CanFrame> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }

    /// Number of attempts that started while another one was in progress
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    pub fn arms(&self) -> usize {
        self.arms.load(Ordering::SeqCst)
    }

    /// Filter passed to initialization; `None` if not initialized
    pub fn init_filter(&self) -> Option<Option<Filter>> {
        *self.init_filter.lock().unwrap()
    }

    pub fn filters(&self) -> Vec<Filter> {
        self.filters.lock().unwrap().clone()
    }

    /// Plays the receive interrupt. Delivers only if a reception is armed.
    pub fn deliver(&self, events: Events<'_>, frame: &CanFrame) -> bool {
        if self.armed.swap(false, Ordering::SeqCst) {
            events.frame_received(frame);
            true
        } else {
            false
        }
    }
}

impl LinkBackend for Scripted {
    fn init_link(&mut self, filter: Option<Filter>) -> Result<(), BackendError> {
        if self.fail_init {
            return Err(BackendError::Peripheral);
        }
        *self.init_filter.lock().unwrap() = Some(filter);
        Ok(())
    }

    fn configure_filter(&self, filter: Filter) -> Result<(), BackendError> {
        if self.fail_filter.load(Ordering::SeqCst) {
            return Err(BackendError::InvalidFilter);
        }
        self.filters.lock().unwrap().push(filter);
        let events = self.filter_link_error.lock().unwrap().take();
        if let Some(events) = events {
            events.link_error();
        }
        Ok(())
    }

    fn send_frame(&self, frame: &CanFrame, timeout: Duration) -> SendStatus {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        self.sent.lock().unwrap().push(*frame);
        self.timeouts.lock().unwrap().push(timeout);
        if !self.send_delay.is_zero() {
            std::thread::sleep(self.send_delay);
        }
        let status = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_response);
        self.in_flight.store(false, Ordering::SeqCst);
        status
    }

    fn arm_receive(&self) -> Result<(), BackendError> {
        if self.fail_arm.load(Ordering::SeqCst) {
            return Err(BackendError::Peripheral);
        }
        if self.armed.swap(true, Ordering::SeqCst) {
            return Err(BackendError::AlreadyArmed);
        }
        self.arms.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Handler collecting every frame it sees
#[derive(Default)]
pub struct Recorder {
    frames: Mutex<Vec<CanFrame>>,
}

impl Recorder {
    pub fn frames(&self) -> Vec<CanFrame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl FrameHandler for Recorder {
    fn on_frame(&self, frame: &CanFrame) {
        self.frames.lock().unwrap().push(*frame);
    }
}

#[derive(Default)]
pub struct Activities(Mutex<Vec<Activity>>);

impl Activities {
    pub fn take(&self) -> Vec<Activity> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl Indicator for Activities {
    fn signal(&self, activity: Activity) {
        self.0.lock().unwrap().push(activity);
    }
}
