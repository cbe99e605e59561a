//! Command bridge: exposes the connected-devices registry to the viewer UI.
//!
//! Every command function here takes the shared [`AppState`] and returns a
//! [`CommandResult`], which the UI shell serialises to JSON.  The presentation
//! layer is the only consumer of this module; it must NOT be imported by the
//! application or domain layers.
//!
//! # Data Transfer Objects (DTOs)
//!
//! [`Device`] already serialises with the frontend's field names, so
//! [`DeviceDto`] is an alias rather than a second copy of the record.
//!
//! # `CommandResult<T>` wrapper
//!
//! All commands return `CommandResult<T>` rather than `Result<T, E>` so every
//! response has the same shape: `{ success: bool, data: T | null,
//! error: string | null }`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use viewer_core::{Availability, Device};

use crate::application::connected_devices::ConnectedDevicesService;
use crate::infrastructure::storage::config::AppConfig;

// ── Shared application state ──────────────────────────────────────────────────

/// Application state shared between the transport pump and UI commands.
///
/// Built once per viewer session and passed around as `Arc<AppState>`.  Fields
/// use the async Tokio mutex because every consumer runs inside the runtime.
pub struct AppState {
    /// The connected-devices registry.
    pub connected_devices: Mutex<ConnectedDevicesService>,
    /// The configuration the registry was built from.
    pub config: Mutex<AppConfig>,
}

impl AppState {
    /// Builds state from an explicit configuration.
    pub fn from_config(config: AppConfig) -> Arc<Self> {
        let service = ConnectedDevicesService::with_policy(config.registry.capacity_policy());
        Arc::new(Self {
            connected_devices: Mutex::new(service),
            config: Mutex::new(config),
        })
    }
}

// ── Data Transfer Objects (Presentation layer) ────────────────────────────────

/// Device record as returned to the UI.
pub type DeviceDto = Device;

/// Unified response wrapper used by UI commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns the admitted devices in admission order.
pub async fn get_devices(state: Arc<AppState>) -> CommandResult<Vec<DeviceDto>> {
    let service = state.connected_devices.lock().await;
    CommandResult::ok(service.get_devices())
}

/// Returns whether another device may connect.
pub async fn is_slot_available(state: Arc<AppState>) -> CommandResult<bool> {
    let service = state.connected_devices.lock().await;
    CommandResult::ok(service.is_slot_available())
}

/// Returns the availability signal (`"available"` / `"occupied"`).
pub async fn get_availability(state: Arc<AppState>) -> CommandResult<Availability> {
    let service = state.connected_devices.lock().await;
    CommandResult::ok(service.availability())
}

/// Returns the device currently mid-handshake, or `null` when there is none.
pub async fn get_pending_connection_device(
    state: Arc<AppState>,
) -> CommandResult<Option<DeviceDto>> {
    let service = state.connected_devices.lock().await;
    let pending = service.pending_connection_device();
    CommandResult::ok((!pending.is_null()).then(|| pending.clone()))
}

/// Disconnects one device.  Returns `true` if it was connected.
///
/// An unknown id, including the null device's empty id, is reported as
/// `false`, not as an error.
pub async fn disconnect_device(state: Arc<AppState>, device_id: String) -> CommandResult<bool> {
    let mut service = state.connected_devices.lock().await;
    let removed = service.disconnect_device_by_id(&device_id).await;
    CommandResult::ok(removed)
}

/// Disconnects every device (e.g. the "Restart Connection" button).
pub async fn disconnect_all_devices(state: Arc<AppState>) -> CommandResult<()> {
    let mut service = state.connected_devices.lock().await;
    service.disconnect_all_devices();
    service.reset_pending_connection_device();
    CommandResult::ok(())
}

/// Returns the configuration the registry was built from.
pub async fn get_config(state: Arc<AppState>) -> CommandResult<AppConfig> {
    let config = state.config.lock().await;
    CommandResult::ok(config.clone())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
