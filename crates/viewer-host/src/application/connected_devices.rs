//! ConnectedDevicesService: the registry of devices sharing their screen with
//! this viewer.
//!
//! The service is the single entry point used by the collaborators around it:
//!
//! - The **transport layer** admits and removes devices, and records the one
//!   device that is mid-handshake (the *pending connection device*).
//! - The **presentation layer** lists devices, asks whether another device may
//!   connect, and subscribes to availability changes.
//!
//! Admitted devices are stored in a [`SlotStore`]; the service adds the pending
//! slot and the availability broadcast on top.
//!
//! # Availability broadcast
//!
//! Every mutation (admit, disconnect one, disconnect all) recomputes
//! [`Availability`] and hands it to every subscribed listener, in subscription
//! order, before the mutating call returns.  The broadcast is unconditional:
//! listeners hear about every mutation, not only transitions.
//!
//! ```text
//! add_device ─┐
//! disconnect_*├─► SlotStore ─► availability() ─► listener 1
//!             │                                ├► listener 2  (Err / panic: logged, skipped)
//!             │                                └► listener 3
//! ```
//!
//! The listener list is snapshotted when the broadcast starts.  A listener
//! unsubscribed part-way through is skipped for the rest of that broadcast.
//!
//! Changing the pending connection device never triggers a broadcast; it is a
//! separate signal read by the handshake UI.

use std::future::{self, Ready};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, error, info};
use viewer_core::{Availability, CapacityPolicy, Device, SlotError};

use super::slot_store::SlotStore;

/// An observer of availability changes.
///
/// Implemented for every `Fn(Availability) -> anyhow::Result<()>` closure, so
/// most callers subscribe with a closure.
pub trait AvailabilityListener: Send + Sync {
    /// Called once on subscription and again after every registry mutation.
    ///
    /// # Errors
    ///
    /// An error is logged by the service and does not stop delivery to the
    /// remaining listeners.
    fn on_availability(&self, state: Availability) -> anyhow::Result<()>;
}

impl<F> AvailabilityListener for F
where
    F: Fn(Availability) -> anyhow::Result<()> + Send + Sync,
{
    fn on_availability(&self, state: Availability) -> anyhow::Result<()> {
        self(state)
    }
}

type ListenerId = u64;

/// One subscribed listener.  `active` is shared with its [`Subscription`] and
/// cleared on unsubscribe, so a broadcast already holding a snapshot can skip
/// the entry without taking the lock.
#[derive(Clone)]
struct ListenerEntry {
    id: ListenerId,
    active: Arc<AtomicBool>,
    listener: Arc<dyn AvailabilityListener>,
}

#[derive(Default)]
struct ListenerSet {
    next_id: ListenerId,
    entries: Vec<ListenerEntry>,
}

impl ListenerSet {
    fn insert(&mut self, listener: Arc<dyn AvailabilityListener>) -> ListenerEntry {
        let entry = ListenerEntry {
            id: self.next_id,
            active: Arc::new(AtomicBool::new(true)),
            listener,
        };
        self.next_id += 1;
        self.entries.push(entry.clone());
        entry
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }
}

// Listeners run outside the lock, so a poisoned mutex can only come from a
// panic inside `ListenerSet` itself; its data is still consistent.
fn lock(set: &Mutex<ListenerSet>) -> MutexGuard<'_, ListenerSet> {
    set.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by [`ConnectedDevicesService::add_availability_listener`].
///
/// Dropping the handle does **not** unsubscribe; call
/// [`unsubscribe`](Self::unsubscribe).
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
    id: ListenerId,
    active: Arc<AtomicBool>,
    listeners: Weak<Mutex<ListenerSet>>,
}

impl Subscription {
    /// Removes the listener.  No notification reaches it afterwards.
    ///
    /// Safe to call any number of times, and after the service is gone.
    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::Release);
        if let Some(listeners) = self.listeners.upgrade() {
            if lock(&listeners).remove(self.id) {
                debug!(listener_id = self.id, "availability listener removed");
            }
        }
    }
}

/// The connected-devices registry.
///
/// Construct one per viewer session and share it explicitly (see
/// `infrastructure::ui_bridge::AppState`).
pub struct ConnectedDevicesService {
    slot: SlotStore,
    pending_connection_device: Device,
    listeners: Arc<Mutex<ListenerSet>>,
}

impl Default for ConnectedDevicesService {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectedDevicesService {
    /// Creates an empty registry with no capacity ceiling.
    pub fn new() -> Self {
        Self::from_store(SlotStore::new())
    }

    /// Creates an empty registry whose admissions are checked by `policy`.
    pub fn with_policy(policy: Box<dyn CapacityPolicy>) -> Self {
        Self::from_store(SlotStore::with_policy(policy))
    }

    fn from_store(slot: SlotStore) -> Self {
        Self {
            slot,
            pending_connection_device: Device::null(),
            listeners: Arc::new(Mutex::new(ListenerSet::default())),
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// Returns copies of the admitted devices, in admission order.
    pub fn get_devices(&self) -> Vec<Device> {
        self.slot.snapshot()
    }

    /// Returns `true` if another device may connect.
    pub fn is_slot_available(&self) -> bool {
        self.slot.is_available()
    }

    /// Returns the current availability signal.
    pub fn availability(&self) -> Availability {
        self.slot.availability()
    }

    /// Returns `true` if the device with `id` is admitted.
    pub fn is_occupied_by(&self, id: &str) -> bool {
        self.slot.is_occupied_by(id)
    }

    /// Number of admitted devices.
    pub fn count(&self) -> usize {
        self.slot.count()
    }

    /// The device currently mid-handshake, or the null device.
    pub fn pending_connection_device(&self) -> &Device {
        &self.pending_connection_device
    }

    /// Number of subscribed availability listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    /// Admits `device`, replacing any record with the same id, then notifies
    /// every listener.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::SlotViolation`] if the capacity policy refuses the
    /// device.  Nothing is stored and no listener is notified in that case.
    /// The default [`Unlimited`](viewer_core::Unlimited) policy never refuses.
    pub fn add_device(&mut self, device: Device) -> Result<(), SlotError> {
        let id = device.id.clone();
        self.slot.occupy(device)?;
        info!(device_id = %id, count = self.slot.count(), "device admitted");
        self.notify_availability_listeners();
        Ok(())
    }

    /// Removes the device with `id`, if admitted, then notifies every listener
    /// whether or not anything was removed.
    ///
    /// Removal and notification happen before this returns; the returned
    /// future resolves on its first poll to `true` if a device was removed.
    /// An unknown id is not an error.
    pub fn disconnect_device_by_id(&mut self, id: &str) -> Ready<bool> {
        let removed = self.slot.release_by_id(id);
        if removed {
            info!(device_id = %id, count = self.slot.count(), "device disconnected");
        } else {
            debug!(device_id = %id, "disconnect requested for unknown device");
        }
        self.notify_availability_listeners();
        future::ready(removed)
    }

    /// Removes every device, then notifies every listener.
    pub fn disconnect_all_devices(&mut self) {
        let count = self.slot.count();
        self.slot.release();
        info!(removed = count, "all devices disconnected");
        self.notify_availability_listeners();
    }

    /// Records `device` as the one currently mid-handshake.
    ///
    /// Does not admit it and does not notify availability listeners.
    pub fn set_pending_connection_device(&mut self, device: Device) {
        debug!(device_id = %device.id, "pending connection device set");
        self.pending_connection_device = device;
    }

    /// Resets the pending connection device to the null device.
    pub fn reset_pending_connection_device(&mut self) {
        debug!("pending connection device reset");
        self.pending_connection_device = Device::null();
    }

    // ── Listeners ───────────────────────────────────────────────────────────

    /// Subscribes `listener` and immediately calls it once with the current
    /// availability.
    ///
    /// Returns the [`Subscription`] used to unsubscribe.
    pub fn add_availability_listener<L>(&self, listener: L) -> Subscription
    where
        L: AvailabilityListener + 'static,
    {
        let entry = lock(&self.listeners).insert(Arc::new(listener));
        debug!(listener_id = entry.id, "availability listener added");

        deliver(entry.id, entry.listener.as_ref(), self.availability());

        Subscription {
            id: entry.id,
            active: entry.active,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    fn notify_availability_listeners(&self) {
        let state = self.availability();
        let snapshot = lock(&self.listeners).entries.clone();
        debug!(%state, listeners = snapshot.len(), "broadcasting availability");

        for entry in snapshot {
            // Skip listeners unsubscribed by an earlier listener in this pass.
            if !entry.active.load(Ordering::Acquire) {
                continue;
            }
            deliver(entry.id, entry.listener.as_ref(), state);
        }
    }
}

/// Invokes one listener, containing any error or panic it raises.
fn deliver(id: ListenerId, listener: &dyn AvailabilityListener, state: Availability) {
    match panic::catch_unwind(AssertUnwindSafe(|| listener.on_availability(state))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(listener_id = id, "connected devices availability listener failed: {e:#}");
        }
        Err(_) => {
            error!(listener_id = id, "connected devices availability listener panicked");
        }
    }
}
