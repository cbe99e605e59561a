//! SlotStore: the authoritative holder of admitted devices.
//!
//! The store maps each device id to the record captured at admission time.
//! It is owned exclusively by the
//! [`ConnectedDevicesService`](super::connected_devices::ConnectedDevicesService);
//! nothing else mutates it.
//!
//! # Ordering
//!
//! Devices enumerate in admission order.  Replacing the record of an id that
//! is already admitted keeps that id's original position, so a device that
//! re-sends its descriptor does not jump to the end of the UI list.
//!
//! Internally a `BTreeMap<u64, Device>` keyed by an admission sequence number
//! gives ordered iteration, and a `HashMap<DeviceId, u64>` index gives O(1)
//! membership tests.

use std::collections::{BTreeMap, HashMap};

use tracing::warn;
use viewer_core::{Availability, CapacityPolicy, Device, DeviceId, SlotError, Unlimited};

/// In-memory keyed collection of admitted devices.
pub struct SlotStore {
    devices: BTreeMap<u64, Device>,
    index: HashMap<DeviceId, u64>,
    next_seq: u64,
    policy: Box<dyn CapacityPolicy>,
}

impl Default for SlotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotStore {
    /// Creates an empty store with no capacity ceiling.
    pub fn new() -> Self {
        Self::with_policy(Box::new(Unlimited))
    }

    /// Creates an empty store that consults `policy` before each admission.
    pub fn with_policy(policy: Box<dyn CapacityPolicy>) -> Self {
        Self {
            devices: BTreeMap::new(),
            index: HashMap::new(),
            next_seq: 0,
            policy,
        }
    }

    /// Inserts `device`, or replaces the record already stored under its id.
    ///
    /// The store keeps its own copy; later changes to the caller's value do
    /// not reach it.
    ///
    /// # Errors
    ///
    /// Returns [`SlotError::SlotViolation`] if the capacity policy refuses a
    /// new id.  The store is left unchanged in that case.
    pub fn occupy(&mut self, device: Device) -> Result<(), SlotError> {
        if let Some(&seq) = self.index.get(&device.id) {
            self.devices.insert(seq, device);
            return Ok(());
        }

        if let Err(e) = self.policy.check_admission(self.count(), &device) {
            warn!(device_id = %device.id, count = self.count(), "admission refused: {e}");
            return Err(e);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(device.id.clone(), seq);
        self.devices.insert(seq, device);
        Ok(())
    }

    /// Removes the record for `id`.
    ///
    /// Returns `true` if a record was removed, `false` if `id` was absent.
    pub fn release_by_id(&mut self, id: &str) -> bool {
        match self.index.remove(id) {
            Some(seq) => {
                self.devices.remove(&seq);
                true
            }
            None => false,
        }
    }

    /// Removes every record.
    pub fn release(&mut self) {
        self.devices.clear();
        self.index.clear();
    }

    /// Returns `true` if new devices may currently connect.
    pub fn is_available(&self) -> bool {
        self.policy.is_available(self.count())
    }

    /// Returns [`is_available`](Self::is_available) as the broadcast signal.
    pub fn availability(&self) -> Availability {
        Availability::from_open(self.is_available())
    }

    /// Returns copies of all stored devices in admission order.
    pub fn snapshot(&self) -> Vec<Device> {
        self.devices.values().cloned().collect()
    }

    /// Returns `true` if a device with `id` is admitted.
    pub fn is_occupied_by(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Number of admitted devices.
    pub fn count(&self) -> usize {
        self.index.len()
    }
}
