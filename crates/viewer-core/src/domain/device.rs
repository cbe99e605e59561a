//! Remote device domain entity.
//!
//! A [`Device`] describes one remote participant that shares its screen with
//! the viewer.  Records are plain values: the registry stores its own copy on
//! admission and hands out copies on every read, so nothing a caller does to
//! a `Device` it holds can reach the registry's state.

use serde::{Deserialize, Serialize};

/// Sentinel used for a screen dimension the device did not report.
pub const UNKNOWN_DIMENSION: i32 = -1;

/// Stable identifier of a device connection.
///
/// Assigned by the transport layer; the registry treats it as an opaque key.
pub type DeviceId = String;

/// A remote screen-sharing participant.
///
/// Field names serialise in the shape the frontend already uses: camelCase,
/// except for the upper-case acronyms in `sharingSessionID`, `deviceOS` and
/// `deviceIP`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Unique identifier for the connection.  The registry's only key.
    pub id: DeviceId,
    #[serde(rename = "sharingSessionID")]
    pub sharing_session_id: String,
    #[serde(rename = "deviceOS")]
    pub device_os: String,
    pub device_type: String,
    #[serde(rename = "deviceIP")]
    pub device_ip: String,
    pub device_browser: String,
    /// Width in pixels, or [`UNKNOWN_DIMENSION`].
    pub device_screen_width: i32,
    /// Height in pixels, or [`UNKNOWN_DIMENSION`].
    pub device_screen_height: i32,
    pub device_room_id: String,
}

impl Device {
    /// Returns the null device: every string empty, both dimensions unknown.
    ///
    /// Represents "no device".  It is the resting value of the pending
    /// connection slot and is never admitted into the slot store.
    pub fn null() -> Self {
        Self {
            id: String::new(),
            sharing_session_id: String::new(),
            device_os: String::new(),
            device_type: String::new(),
            device_ip: String::new(),
            device_browser: String::new(),
            device_screen_width: UNKNOWN_DIMENSION,
            device_screen_height: UNKNOWN_DIMENSION,
            device_room_id: String::new(),
        }
    }

    /// Returns `true` if this record equals the null sentinel.
    pub fn is_null(&self) -> bool {
        *self == Self::null()
    }

    /// Returns `true` when both screen dimensions were reported.
    pub fn has_known_resolution(&self) -> bool {
        self.device_screen_width != UNKNOWN_DIMENSION
            && self.device_screen_height != UNKNOWN_DIMENSION
    }
}

impl Default for Device {
    fn default() -> Self {
        Self::null()
    }
}
