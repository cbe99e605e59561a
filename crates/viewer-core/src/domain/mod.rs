//! Domain entities for the screen-sharing viewer.
//!
//! This module contains pure business rules with no infrastructure
//! dependencies.  Code in outer layers (the registry service, the UI bridge,
//! the transport adapter) depends on these types, but the domain never
//! depends on them.

/// Two-valued availability signal broadcast to observers.
pub mod availability;

/// Capacity policies consulted before a device is admitted.
pub mod capacity;

/// The remote device record.
///
/// See [`device::Device`] for the main type.
pub mod device;
