//! Transport adapter: drives the registry from connection-layer events.
//!
//! The peer-connection layer (WebRTC signalling, sockets, ...) lives outside
//! this crate.  It reports progress as [`TransportEvent`]s on a Tokio channel,
//! and [`run_transport_pump`] applies them to the shared registry in arrival
//! order.
//!
//! ```text
//! peer connection ──TransportEvent──► mpsc ──► run_transport_pump ──► ConnectedDevicesService
//! ```
//!
//! When the connection layer runs in another process, events arrive as one
//! JSON object per line (see [`decode_event`]):
//!
//! ```json
//! {"type":"handshakeStarted","payload":{"id":"conn-1", ...}}
//! {"type":"deviceDisconnected","payload":"conn-1"}
//! {"type":"sessionReset"}
//! ```
//!
//! [`start_line_feed`] reads that feed on a dedicated OS thread.  A blocked
//! read there never holds up runtime shutdown, so Ctrl-C ends the process even
//! while the connection layer keeps the pipe open.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use viewer_core::{Device, DeviceId, SlotError};

use crate::application::connected_devices::ConnectedDevicesService;
use crate::infrastructure::ui_bridge::AppState;

/// Progress reported by the peer-connection layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum TransportEvent {
    /// A device asked to connect; the handshake is in progress.
    HandshakeStarted(Device),
    /// The in-progress handshake was cancelled or failed.
    HandshakeAborted,
    /// The handshake completed; the device should be admitted.
    DeviceConnected(Device),
    /// A device closed its connection.
    DeviceDisconnected(DeviceId),
    /// The whole session is being torn down or re-initiated.
    SessionReset,
}

/// Decodes one line of the JSON event feed.
///
/// # Errors
///
/// Returns the `serde_json` error for malformed or unknown events.
pub fn decode_event(line: &str) -> Result<TransportEvent, serde_json::Error> {
    serde_json::from_str(line.trim())
}

/// Starts a thread that decodes JSON lines from `reader` and forwards them to
/// `tx`.
///
/// Blank lines are skipped and malformed lines are logged and skipped.  The
/// thread stops at end of input, on a read error, or once the receiver is
/// dropped; dropping its sender then lets the pump drain and stop.
///
/// # Errors
///
/// Returns the I/O error if the thread cannot be spawned.
pub fn start_line_feed<R>(
    reader: R,
    tx: mpsc::Sender<TransportEvent>,
) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name("viewer-event-feed".to_string())
        .spawn(move || line_feed_loop(reader, tx))
}

fn line_feed_loop<R: BufRead>(reader: R, tx: mpsc::Sender<TransportEvent>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("event feed read failed: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match decode_event(&line) {
            Ok(event) => {
                if tx.blocking_send(event).is_err() {
                    // Pump gone: the host is shutting down.
                    break;
                }
            }
            Err(e) => warn!("ignoring malformed transport event: {e}"),
        }
    }
    info!("event feed closed");
}

/// Applies a single event to `service`.
///
/// `DeviceConnected` also clears the pending slot when it still holds the
/// device that just finished its handshake; a different pending device is left
/// alone.
///
/// # Errors
///
/// Returns [`SlotError::SlotViolation`] when a `DeviceConnected` admission is
/// refused by the capacity policy.
pub async fn apply_transport_event(
    service: &mut ConnectedDevicesService,
    event: TransportEvent,
) -> Result<(), SlotError> {
    match event {
        TransportEvent::HandshakeStarted(device) => {
            service.set_pending_connection_device(device);
            Ok(())
        }
        TransportEvent::HandshakeAborted => {
            service.reset_pending_connection_device();
            Ok(())
        }
        TransportEvent::DeviceConnected(device) => {
            let finished_handshake = service.pending_connection_device().id == device.id;
            let result = service.add_device(device);
            if finished_handshake {
                service.reset_pending_connection_device();
            }
            result
        }
        TransportEvent::DeviceDisconnected(id) => {
            service.disconnect_device_by_id(&id).await;
            Ok(())
        }
        TransportEvent::SessionReset => {
            service.disconnect_all_devices();
            service.reset_pending_connection_device();
            Ok(())
        }
    }
}

/// Applies events from `rx` to the registry in `state` until the sender side
/// is dropped.
pub async fn run_transport_pump(state: Arc<AppState>, mut rx: mpsc::Receiver<TransportEvent>) {
    info!("transport pump started");
    while let Some(event) = rx.recv().await {
        debug!(?event, "transport event");
        let mut service = state.connected_devices.lock().await;
        if let Err(e) = apply_transport_event(&mut service, event).await {
            warn!("transport event rejected: {e}");
        }
    }
    info!("transport pump stopped");
}
