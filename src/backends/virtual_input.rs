//! In-memory backend.
//!
//! [`VirtualBackend`] behaves like a real backend from the manager's point of
//! view: devices can be present at startup, plugged and unplugged later, fed
//! events, refuse to open, or fail mid-stream. The matching
//! [`VirtualController`] handle is kept by the caller (a test, a replay tool,
//! an on-screen pad) to script all of that.
//!
//! ```
//! use stickpad::backends::virtual_input::VirtualBackend;
//! use stickpad::manager::DeviceManager;
//!
//! let (backend, pad) = VirtualBackend::new();
//! pad.insert("virtual:0", Vec::new());
//! let mut manager = DeviceManager::new(Box::new(backend));
//! pad.press_button("virtual:0", 0x130);
//! assert!(!manager.poll_events().is_empty());
//! ```

use crate::backends::{Backend, HotplugEvent};
use crate::device::{AxisCapability, Device, ReadOutcome};
use crate::error::{DeviceLost, DeviceOpenError};
use crate::event::{EventKind, RawInputEvent};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct World {
    /// Devices currently plugged in, with their axes.
    present: HashMap<String, Vec<AxisCapability>>,
    queues: HashMap<String, VecDeque<RawInputEvent>>,
    hotplug: VecDeque<HotplugEvent>,
    /// Paths that refuse to open.
    denied: HashSet<String>,
    /// Paths whose next poll reports end of stream.
    lost: HashSet<String>,
    clock: u64,
}

type Shared = Arc<Mutex<World>>;

fn lock(world: &Shared) -> MutexGuard<'_, World> {
    world.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripting handle for a [`VirtualBackend`].
#[derive(Clone)]
pub struct VirtualController {
    world: Shared,
}

impl VirtualController {
    /// Make a device present without a hotplug notification, as if it was
    /// connected before the manager started.
    pub fn insert(&self, path: &str, axes: Vec<AxisCapability>) {
        let mut world = lock(&self.world);
        world.present.insert(path.to_string(), axes);
        world.queues.insert(path.to_string(), VecDeque::new());
    }

    /// Plug a device in and queue an arrival notification.
    pub fn connect(&self, path: &str, axes: Vec<AxisCapability>) {
        self.insert(path, axes);
        lock(&self.world)
            .hotplug
            .push_back(HotplugEvent::Detected(path.to_string()));
    }

    /// Unplug a device and queue a removal notification. Undelivered events are discarded.
    pub fn disconnect(&self, path: &str) {
        let mut world = lock(&self.world);
        world.present.remove(path);
        world.queues.remove(path);
        world.lost.remove(path);
        world.hotplug.push_back(HotplugEvent::Removed(path.to_string()));
    }

    /// Make future opens of `path` fail with `PermissionDenied`.
    pub fn deny(&self, path: &str) {
        lock(&self.world).denied.insert(path.to_string());
    }

    /// Make the next poll of `path` report end of stream after its queued events.
    pub fn lose(&self, path: &str) {
        lock(&self.world).lost.insert(path.to_string());
    }

    /// Inject a raw input event into the virtual device.
    pub fn feed(&self, path: &str, kind: EventKind, control: u16, value: i32) {
        let mut world = lock(&self.world);
        world.clock += 1_000;
        let time = world.clock;
        if let Some(queue) = world.queues.get_mut(path) {
            queue.push_back(RawInputEvent {
                time,
                kind,
                control,
                value,
            });
        }
    }

    /// Convenience method to set an axis value.
    pub fn set_axis(&self, path: &str, axis: u16, value: i32) {
        self.feed(path, EventKind::Axis, axis, value);
    }

    pub fn set_hat(&self, path: &str, hat: u16, value: i32) {
        self.feed(path, EventKind::Hat, hat, value);
    }

    pub fn press_button(&self, path: &str, button: u16) {
        self.feed(path, EventKind::Button, button, 1);
    }

    pub fn repeat_button(&self, path: &str, button: u16) {
        self.feed(path, EventKind::Button, button, 2);
    }

    pub fn release_button(&self, path: &str, button: u16) {
        self.feed(path, EventKind::Button, button, 0);
    }

    /// Number of events queued for `path` and not yet polled.
    pub fn pending(&self, path: &str) -> usize {
        lock(&self.world).queues.get(path).map_or(0, VecDeque::len)
    }
}

/// Backend over an in-memory device world.
pub struct VirtualBackend {
    world: Shared,
}

impl VirtualBackend {
    pub fn new() -> (Self, VirtualController) {
        let world = Shared::default();
        (
            Self {
                world: world.clone(),
            },
            VirtualController { world },
        )
    }
}

impl Backend for VirtualBackend {
    fn scan(&mut self) -> Vec<String> {
        let mut paths: Vec<String> = lock(&self.world).present.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn open(&mut self, path: &str) -> Result<Box<dyn Device>, DeviceOpenError> {
        let world = lock(&self.world);
        if world.denied.contains(path) {
            return Err(DeviceOpenError::PermissionDenied {
                path: path.to_string(),
            });
        }
        let axes = world
            .present
            .get(path)
            .ok_or_else(|| DeviceOpenError::NotFound {
                path: path.to_string(),
            })?
            .clone();
        Ok(Box::new(VirtualDevice {
            path: path.to_string(),
            axes,
            world: self.world.clone(),
        }))
    }

    fn poll_hotplug(&mut self) -> Vec<HotplugEvent> {
        lock(&self.world).hotplug.drain(..).collect()
    }
}

/// A device opened from a [`VirtualBackend`].
pub struct VirtualDevice {
    path: String,
    axes: Vec<AxisCapability>,
    world: Shared,
}

impl Device for VirtualDevice {
    fn poll(&mut self) -> ReadOutcome {
        let mut world = lock(&self.world);
        let events: Vec<RawInputEvent> = world
            .queues
            .get_mut(&self.path)
            .map(|q| q.drain(..).collect())
            .unwrap_or_default();
        let lost = world
            .lost
            .remove(&self.path)
            .then_some(DeviceLost::EndOfStream);
        ReadOutcome { events, lost }
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn axes(&self) -> &[AxisCapability] {
        &self.axes
    }
}
