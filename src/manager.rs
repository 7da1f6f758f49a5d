//! Device registry.
//!
//! [`DeviceManager`] owns every open [`Device`], keyed two ways:
//! - by [`DeviceId`], in an arena of slots (ids are never reused, so a slot is
//!   never refilled once emptied)
//! - by device path, so hotplug removals can find the right slot
//!
//! It republishes each device's [`RawInputEvent`](crate::event::RawInputEvent)s as
//! [`GamepadEvent`]s tagged with the device's shared [`DeviceIdentity`].
//!
//! # Driving the manager
//! - [`poll_events`](DeviceManager::poll_events): hotplug first, then every device.
//! - [`process_hotplug`](DeviceManager::process_hotplug) /
//!   [`process_device`](DeviceManager::process_device): for event loops that watch
//!   the descriptors from [`readiness_sources`](DeviceManager::readiness_sources).

use crate::backends::{Backend, HotplugEvent};
use crate::device::{Device, DeviceId, DeviceIdentity};
use crate::event::GamepadEvent;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::os::fd::RawFd;
use std::sync::Arc;

/// What the manager reports.
#[derive(Clone, Debug)]
pub enum ManagerEvent {
    Connected(Arc<DeviceIdentity>),
    Disconnected(Arc<DeviceIdentity>),
    Input(GamepadEvent),
}

/// A descriptor to watch and what to call when it becomes readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadySource {
    /// Call [`DeviceManager::process_hotplug`].
    Hotplug,
    /// Call [`DeviceManager::process_device`].
    Device(DeviceId),
}

struct Slot {
    identity: Arc<DeviceIdentity>,
    device: Box<dyn Device>,
}

pub struct DeviceManager {
    backend: Box<dyn Backend>,
    slots: Vec<Option<Slot>>,
    by_path: HashMap<String, DeviceId>,
    /// Connect events produced outside a poll (startup scan, explicit add).
    queued: Vec<ManagerEvent>,
}

impl DeviceManager {
    /// Scan for connected devices and open all of them.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        let mut manager = Self {
            backend,
            slots: Vec::new(),
            by_path: HashMap::new(),
            queued: Vec::new(),
        };

        let found = manager.backend.scan();
        info!("Discovered {} input device(s)", found.len());
        for path in found {
            manager.add_device(&path);
        }

        manager
    }

    /// Open `path` and start relaying its events.
    ///
    /// Returns the new id, the existing id if the path is already open, or
    /// `None` if the device could not be opened.
    pub fn add_device(&mut self, path: &str) -> Option<DeviceId> {
        if let Some(id) = self.by_path.get(path) {
            debug!("{path} is already open as device {id}");
            return Some(*id);
        }

        let device = match self.backend.open(path) {
            Ok(device) => device,
            Err(e) => {
                warn!("Failed to open gamepad: {e}");
                return None;
            }
        };

        let id = self.slots.len() as DeviceId;
        let identity = Arc::new(DeviceIdentity {
            id,
            device_node: device.path().to_string(),
            axes: device.axes().to_vec(),
        });
        info!("device {id} connected: {path}");

        self.slots.push(Some(Slot {
            identity: identity.clone(),
            device,
        }));
        self.by_path.insert(path.to_string(), id);
        self.queued.push(ManagerEvent::Connected(identity));
        Some(id)
    }

    /// Close the device opened from `path`, if any.
    pub fn remove_device(&mut self, path: &str) -> Option<Arc<DeviceIdentity>> {
        let id = self.by_path.remove(path)?;
        let slot = self.slots.get_mut(id as usize)?.take()?;
        info!("device {id} disconnected: {path}");
        Some(slot.identity)
    }

    /// Apply pending hotplug notifications.
    pub fn process_hotplug(&mut self) -> Vec<ManagerEvent> {
        let mut out = std::mem::take(&mut self.queued);
        for change in self.backend.poll_hotplug() {
            match change {
                HotplugEvent::Detected(path) => {
                    self.add_device(&path);
                    out.append(&mut self.queued);
                }
                HotplugEvent::Removed(path) => {
                    if let Some(identity) = self.remove_device(&path) {
                        out.push(ManagerEvent::Disconnected(identity));
                    }
                }
            }
        }
        out
    }

    /// Drain one device. A device that reports loss is torn down after its
    /// remaining events are relayed.
    pub fn process_device(&mut self, id: DeviceId) -> Vec<ManagerEvent> {
        let mut out = std::mem::take(&mut self.queued);
        let Some(slot) = self.slots.get_mut(id as usize).and_then(Option::as_mut) else {
            return out;
        };

        let outcome = slot.device.poll();
        out.extend(
            outcome
                .events
                .into_iter()
                .map(|raw| ManagerEvent::Input(GamepadEvent::new(slot.identity.clone(), raw))),
        );

        if let Some(lost) = outcome.lost {
            let path = slot.identity.device_node.clone();
            warn!("device {id} ({path}) lost: {lost}");
            if let Some(identity) = self.remove_device(&path) {
                out.push(ManagerEvent::Disconnected(identity));
            }
        }
        out
    }

    /// Hotplug first, then every open device in id order.
    pub fn poll_events(&mut self) -> Vec<ManagerEvent> {
        let mut out = self.process_hotplug();
        for id in self.device_ids() {
            out.extend(self.process_device(id));
        }
        out
    }

    /// Ids of currently open devices, ascending.
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.devices().map(|identity| identity.id).collect()
    }

    /// Identities of currently open devices, ascending by id.
    pub fn devices(&self) -> impl Iterator<Item = &Arc<DeviceIdentity>> {
        self.slots.iter().flatten().map(|slot| &slot.identity)
    }

    pub fn identity(&self, id: DeviceId) -> Option<&Arc<DeviceIdentity>> {
        self.slots
            .get(id as usize)
            .and_then(Option::as_ref)
            .map(|slot| &slot.identity)
    }

    pub fn id_for_path(&self, path: &str) -> Option<DeviceId> {
        self.by_path.get(path).copied()
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// Descriptors an external event loop should watch for readability.
    pub fn readiness_sources(&self) -> Vec<(ReadySource, RawFd)> {
        let mut out = Vec::new();
        if let Some(fd) = self.backend.hotplug_fd() {
            out.push((ReadySource::Hotplug, fd));
        }
        for slot in self.slots.iter().flatten() {
            if let Some(fd) = slot.device.raw_fd() {
                out.push((ReadySource::Device(slot.identity.id), fd));
            }
        }
        out
    }
}
