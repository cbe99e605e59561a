//! # viewer-core
//!
//! Shared domain library for the screen-sharing viewer.  It describes the
//! remote devices that share their screen with a viewer session and the rules
//! that decide whether another device may connect.
//!
//! This crate has zero dependencies on OS APIs, UI frameworks, or network
//! sockets.  The registry that stores admitted devices and broadcasts
//! availability lives in `viewer-host`; this crate only defines the types it
//! trades in.
//!
//! # Architecture overview (for beginners)
//!
//! A viewer session is joined by one or more remote devices.  Before a device
//! is admitted it goes through a handshake (the "pending connection"); once
//! the transport layer completes the handshake it hands a [`Device`] record to
//! the registry.
//!
//! - **`domain::device`** – The [`Device`] record and its null sentinel.
//! - **`domain::availability`** – The two-valued [`Availability`] signal sent
//!   to observers.
//! - **`domain::capacity`** – The [`CapacityPolicy`] hook consulted before an
//!   admission, plus the [`SlotError`] it may raise.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `viewer_core::Device` instead of `viewer_core::domain::device::Device`.
pub use domain::availability::Availability;
pub use domain::capacity::{CapacityPolicy, MaxDevices, SlotError, Unlimited};
pub use domain::device::{Device, DeviceId, UNKNOWN_DIMENSION};
