//! # canlink
//!
//! This library multiplexes a single CAN peripheral between one transmit path and one receive
//! path in no_std environments. It serializes transmissions, retries busy or timed-out
//! attempts, dispatches received frames to a user handler, and locks the whole link on any
//! fatal error. No dynamic memory allocation is required.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  ┌────────────────────────┐  ┌─────────┐
//! │ Transmitter ├─►│          Link          │◄─┤ Events  │◄── backend interrupts
//! └─────────────┘  │ ┌────────┐ ┌─────────┐ │  └─────────┘
//! ┌─────────────┐  │ │ Status │ │ Backend │ │
//! │  Receiver   ├─►│ └────────┘ └─────────┘ │
//! └─────────────┘  └────────────────────────┘
//! ```
//! Components:
//! * _Link_ owns the backend and the shared state: the transmit state, the receive state and
//!   the installed frame handler.
//! * _Transmitter_ is a shared handle for sending frames. One frame is in flight at a time;
//!   other callers wait for the link to become ready.
//! * _Receiver_ is a shared handle that starts, pauses, resumes and stops reception.
//! * _Events_ is the handle a backend reports received frames, transmit completions and link
//!   errors through.
//! * _Backend_ is the peripheral driver implementing
//!   [`LinkBackend`](backend::LinkBackend).
//!
//! ## States
//!
//! Transmission is `Ready`, `Busy` or `Blocked`. Reception is `Stopped`, `Started`, `Paused` or
//! `Error`. A hard transmit error blocks transmission for good. A link error, or a failure to
//! initialize the peripheral, program a filter or arm a reception, locks the link: both paths
//! enter their terminal state at once and nothing can bring them back.
//!
//! Invalid receive control calls (e.g. `pause` while stopped) are ignored.
//!
//! ## Concurrency model
//!
//! The Link keeps its state behind a mutex and every state change is a single lock. Handlers
//! and backend calls run outside the lock. There are two mutex implementation options:
//! * _CriticalSectionRawMutex_ is required when the backend reports from interrupts.
//! * _ThreadModeRawMutex_ fits backends that poll the peripheral from thread mode.
//!
//! [`Transmitter::transmit`](transmit::Transmitter::transmit) spins while another caller owns
//! the link. [`Transmitter::transmit_async`](transmit::Transmitter::transmit_async) suspends
//! instead.
//!
//! ## Example
//!
//! ```
//! use canlink::Link;
//! use canlink::config::Config;
//! use canlink::frame::CanFrame;
//! use canlink::loopback::Loopback;
//! use canlink::status::ReceiveState;
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use static_cell::StaticCell;
//!
//! fn on_frame(frame: &CanFrame) {
//!     assert_eq!(frame.data(), b"TesTTesT");
//! }
//!
//! static LINK: StaticCell<Link<CriticalSectionRawMutex, Loopback>> = StaticCell::new();
//! let link = LINK.init(Link::new(Loopback::new(), Config::default()));
//! let (tx, rx, events) = link.split();
//!
//! rx.start(&on_frame);
//! link.send_test().unwrap();
//!
//! // Stands in for the receive interrupt
//! assert!(link.backend().dispatch(events));
//! assert_eq!(rx.status(), ReceiveState::Started);
//! assert!(tx.transmit(&CanFrame::test_pattern(), 0).is_ok());
//! ```
//!
//! ## Limitations
//!
//! * A single peripheral and a single in-flight frame; there is no transmit queue.
//! * Locked links cannot be reset. Create a new link to recover.
#![no_std]

pub use canlink_driver as driver;
pub use canlink_driver::{backend, events, filter, frame, indicator, loopback, time};
pub(crate) use canlink_driver::internal;

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod fault;
mod link;
pub mod receive;
pub mod status;
pub mod transmit;

pub use link::Link;
