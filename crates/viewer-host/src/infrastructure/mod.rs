//! Infrastructure layer for the viewer host.
//!
//! Contains the adapters around the connected-devices registry: configuration
//! storage, the transport event adapter, and the command bridge used by the UI.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `viewer_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod storage;
pub mod transport;
pub mod ui_bridge;
