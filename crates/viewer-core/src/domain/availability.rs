//! Availability signal broadcast to registry observers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether new devices may currently connect to the viewer.
///
/// The value is never stored; the registry derives it from its capacity
/// policy each time it is read or broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// Another device may connect.
    Available,
    /// The viewer is at capacity.
    Occupied,
}

impl Availability {
    /// Maps an "is open for admissions" flag onto the signal.
    pub fn from_open(open: bool) -> Self {
        if open {
            Self::Available
        } else {
            Self::Occupied
        }
    }

    /// Returns `true` for [`Availability::Available`].
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Returns the wire spelling (`"available"` / `"occupied"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
