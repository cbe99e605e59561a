//! Screen-sharing viewer host entry point.
//!
//! Wires logging, configuration and the connected-devices registry together,
//! then feeds transport events into the registry until the feed closes or the
//! process is interrupted.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()            -- log level, registry capacity
//!  └─ AppState::from_config()  -- builds the registry
//!  └─ start tasks
//!       ├─ stdin feed   (OS thread, JSON lines → TransportEvent)
//!       └─ transport pump (TransportEvent → ConnectedDevicesService)
//! ```
//!
//! The connection layer writes one JSON event per line to this process's
//! standard input; see `infrastructure::transport::decode_event`.

use std::io::BufReader;

use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use viewer_core::Availability;
use viewer_host::infrastructure::storage::config::{load_config, AppConfig};
use viewer_host::infrastructure::transport::{
    run_transport_pump, start_line_feed, TransportEvent,
};
use viewer_host::infrastructure::ui_bridge::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config is read before logging starts so its level can seed the filter.
    let (config, config_error) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // `RUST_LOG` overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.viewer.log_level)),
        )
        .init();

    if let Some(e) = config_error {
        warn!("using default configuration: {e}");
    }
    info!(
        max_devices = ?config.registry.max_devices,
        "screen viewer host starting"
    );

    let state = AppState::from_config(config);

    let availability = state
        .connected_devices
        .lock()
        .await
        .add_availability_listener(|availability: Availability| -> anyhow::Result<()> {
            info!(%availability, "viewer availability");
            Ok(())
        });

    // ── Transport pump ────────────────────────────────────────────────────────
    let (tx, rx) = mpsc::channel::<TransportEvent>(64);
    let mut pump = tokio::spawn(run_transport_pump(std::sync::Arc::clone(&state), rx));

    // ── Event feed on stdin ───────────────────────────────────────────────────
    // Plain OS thread, not Tokio's stdin: a pending read must not hold up
    // runtime shutdown.  Closing stdin drops `tx` and stops the pump.
    let _feed = start_line_feed(BufReader::new(std::io::stdin()), tx)?;

    info!("screen viewer host ready.  Press Ctrl-C to exit.");

    tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("shutdown signal received");
        }
        joined = &mut pump => {
            joined?;
            info!("transport pump finished");
        }
    }

    {
        let mut service = state.connected_devices.lock().await;
        service.disconnect_all_devices();
        service.reset_pending_connection_device();
    }
    availability.unsubscribe();

    info!("screen viewer host stopped");
    Ok(())
}
