//! Application layer for the viewer host.
//!
//! Use cases in this layer orchestrate the domain types from `viewer_core`
//! and contain no OS calls, no network I/O, and no file system access.
//!
//! # Sub-modules
//!
//! - **`slot_store`** – The keyed, ordered collection of admitted devices and
//!   its occupancy queries.
//!
//! - **`connected_devices`** – The registry service used by the transport and
//!   presentation layers: admission, disconnection, the pending-connection
//!   slot, and the availability broadcast.

pub mod connected_devices;
pub mod slot_store;
