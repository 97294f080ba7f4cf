//! canlink driver interface
//!
//! The crate provides the boundary between a CAN peripheral driver ("backend") and the canlink
//! core. Backend crates should depend on this crate. canlink users should depend on the
//! `canlink` crate instead.
//!
//! The boundary has two directions:
//! * [`LinkBackend`](backend::LinkBackend) is implemented by the backend and called by the core:
//!   one-time initialization, filter programming, blocking frame submission with a timeout and
//!   single-shot receive arming.
//! * [`Events`](events::Events) is a handle the core hands to the backend. The backend reports
//!   received frames, transmit completions and link errors through it, usually from the
//!   peripheral interrupt handlers.
//!
//! Peripheral bring-up (clocks, pins, bit timing, interrupt priorities) stays entirely inside the
//! backend.
//!
//! The [`loopback`] module provides an in-memory backend for tests and bring-up.

#![no_std]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod backend;
pub mod events;
pub mod filter;
pub mod frame;
pub mod indicator;
pub mod internal;
pub mod loopback;

pub mod time {
    pub use embassy_time::Duration;
}
