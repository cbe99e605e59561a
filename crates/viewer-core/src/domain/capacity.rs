//! Capacity policies consulted before a device is admitted.
//!
//! The registry does not hard-code how many devices may share a screen with
//! one viewer.  Instead it asks a [`CapacityPolicy`] two questions:
//!
//! - *Is the viewer open?*  Drives the [`Availability`](super::availability::Availability)
//!   signal shown in the UI.
//! - *May this device be admitted?*  Checked on every admission of an id that
//!   is not already present.  A rejection surfaces as [`SlotError::SlotViolation`].
//!
//! The default policy is [`Unlimited`]: the viewer is always open and every
//! admission succeeds.  [`MaxDevices`] caps the number of concurrent devices.

use thiserror::Error;

use super::device::Device;

/// Errors raised when a device cannot be admitted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// The capacity policy refused the admission.
    #[error("viewer slot operation failed")]
    SlotViolation,
}

/// Decides whether the slot store accepts more devices.
///
/// Implementations must be cheap and side-effect free: the store calls them
/// on every admission and every availability broadcast.
pub trait CapacityPolicy: Send + Sync {
    /// Returns `true` if a new device may connect while `current` devices are
    /// admitted.
    fn is_available(&self, current: usize) -> bool;

    /// Checks whether `device` may be admitted while `current` devices are
    /// admitted.
    ///
    /// Only called for ids that are not yet in the store; replacing an
    /// existing record never grows the store and is always allowed.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::SlotViolation`] when the admission must be refused.
    fn check_admission(&self, current: usize, device: &Device) -> Result<(), SlotError>;
}

/// No ceiling: the viewer is always available.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unlimited;

impl CapacityPolicy for Unlimited {
    fn is_available(&self, _current: usize) -> bool {
        true
    }

    fn check_admission(&self, _current: usize, _device: &Device) -> Result<(), SlotError> {
        Ok(())
    }
}

/// At most `n` devices admitted at once.
///
/// `MaxDevices(1)` restores single-viewer exclusivity.  `MaxDevices(0)` keeps
/// the viewer permanently occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxDevices(pub usize);

impl CapacityPolicy for MaxDevices {
    fn is_available(&self, current: usize) -> bool {
        current < self.0
    }

    fn check_admission(&self, current: usize, _device: &Device) -> Result<(), SlotError> {
        if self.is_available(current) {
            Ok(())
        } else {
            Err(SlotError::SlotViolation)
        }
    }
}
