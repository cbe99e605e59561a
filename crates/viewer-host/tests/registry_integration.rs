//! Integration tests for the connected-devices registry.
//!
//! # Purpose
//!
//! These tests drive `ConnectedDevicesService` through its public API the way
//! the transport and presentation layers use it.  They walk through a full
//! session:
//!
//! ```text
//! empty ─add A─► [A] ─add B─► [A, B] ─release A─► [B] ─release zzz─► [B] ─disconnect all─► []
//! ```
//!
//! and check the listener contract along the way: one call at subscription,
//! one call per mutation, no calls after unsubscribing, and a faulty listener
//! never silencing the others.

use std::sync::{Arc, Mutex};

use viewer_core::{Availability, Device};
use viewer_host::application::connected_devices::ConnectedDevicesService;

fn device(id: &str) -> Device {
    Device {
        id: id.to_string(),
        sharing_session_id: format!("session-{id}"),
        device_os: "Windows".to_string(),
        device_type: "desktop".to_string(),
        device_ip: "192.168.10.2".to_string(),
        device_browser: "Chrome".to_string(),
        device_screen_width: 1920,
        device_screen_height: 1080,
        device_room_id: "room-1".to_string(),
    }
}

fn ids(service: &ConnectedDevicesService) -> Vec<String> {
    service.get_devices().into_iter().map(|d| d.id).collect()
}

type Log = Arc<Mutex<Vec<Availability>>>;

fn recording_listener(
    log: &Log,
) -> impl Fn(Availability) -> anyhow::Result<()> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |state: Availability| -> anyhow::Result<()> {
        log.lock().unwrap().push(state);
        Ok(())
    }
}

/// Walks the full session from an empty registry to teardown.
#[tokio::test]
async fn test_session_walkthrough() {
    let mut service = ConnectedDevicesService::new();
    let log: Log = Arc::default();
    let _sub = service.add_availability_listener(recording_listener(&log));

    // Step 1: admit A.
    service.add_device(device("A")).unwrap();
    assert_eq!(ids(&service), vec!["A"]);
    assert_eq!(service.count(), 1);

    // Step 2: admit B; insertion order is kept.
    service.add_device(device("B")).unwrap();
    assert_eq!(ids(&service), vec!["A", "B"]);
    assert!(service.is_occupied_by("B"));

    // Step 3: remove A.
    assert!(service.disconnect_device_by_id("A").await);
    assert_eq!(ids(&service), vec!["B"]);

    // Step 4: removing an unknown id changes nothing.
    assert!(!service.disconnect_device_by_id("zzz").await);
    assert_eq!(ids(&service), vec!["B"]);

    // Step 5: tear down.
    service.disconnect_all_devices();
    assert!(service.get_devices().is_empty());

    // One call at subscription plus one per mutation, all "available".
    let received = log.lock().unwrap().clone();
    assert_eq!(received.len(), 6);
    assert!(received.iter().all(|s| *s == Availability::Available));
}

/// A listener subscribed before one admission is called exactly twice.
#[test]
fn test_listener_called_at_subscription_and_after_admission() {
    let mut service = ConnectedDevicesService::new();
    let log: Log = Arc::default();

    let _sub = service.add_availability_listener(recording_listener(&log));
    assert_eq!(*log.lock().unwrap(), vec![Availability::Available]);

    service.add_device(device("C")).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec![Availability::Available, Availability::Available]
    );
}

#[test]
fn test_overwrite_keeps_a_single_record() {
    let mut service = ConnectedDevicesService::new();
    service.add_device(device("A")).unwrap();

    let mut updated = device("A");
    updated.device_browser = "Safari".to_string();
    service.add_device(updated).unwrap();

    let devices = service.get_devices();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].device_browser, "Safari");
}

#[test]
fn test_caller_mutations_never_reach_the_registry() {
    let mut service = ConnectedDevicesService::new();
    let mut original = device("A");
    service.add_device(original.clone()).unwrap();

    // Mutate both the caller's value and a returned snapshot.
    original.device_os = "changed".to_string();
    let mut listed = service.get_devices();
    listed[0].device_os = "changed too".to_string();

    assert_eq!(service.get_devices()[0].device_os, "Windows");
}

#[test]
fn test_unsubscribed_listener_misses_later_mutations() {
    let mut service = ConnectedDevicesService::new();
    let log: Log = Arc::default();
    let sub = service.add_availability_listener(recording_listener(&log));

    sub.unsubscribe();
    service.add_device(device("A")).unwrap();
    service.disconnect_all_devices();

    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn test_failing_listener_does_not_silence_later_listeners() {
    let mut service = ConnectedDevicesService::new();
    let calls = Arc::new(Mutex::new(0u32));
    let counter = Arc::clone(&calls);
    let _failing =
        service.add_availability_listener(move |_state: Availability| -> anyhow::Result<()> {
            *counter.lock().unwrap() += 1;
            Err(anyhow::anyhow!("render target gone"))
        });
    let log: Log = Arc::default();
    let _ok = service.add_availability_listener(recording_listener(&log));

    service.add_device(device("A")).unwrap();
    service.disconnect_all_devices();

    assert_eq!(*calls.lock().unwrap(), 3);
    assert_eq!(log.lock().unwrap().len(), 3);
}

#[test]
fn test_pending_device_round_trip_leaves_devices_alone() {
    let mut service = ConnectedDevicesService::new();
    service.add_device(device("A")).unwrap();
    let before = service.get_devices();

    service.set_pending_connection_device(device("D"));
    assert_eq!(service.pending_connection_device(), &device("D"));
    service.reset_pending_connection_device();

    assert_eq!(service.pending_connection_device(), &Device::null());
    assert_eq!(service.get_devices(), before);
}

#[test]
fn test_disconnect_all_always_empties() {
    let mut service = ConnectedDevicesService::new();
    service.disconnect_all_devices();
    assert_eq!(service.count(), 0);

    for i in 0..10 {
        service.add_device(device(&format!("d{i}"))).unwrap();
    }
    service.disconnect_all_devices();
    assert_eq!(service.count(), 0);
}
