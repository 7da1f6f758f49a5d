//! Device abstraction and per-device identity.
//!
//! A [`Device`] is one open input handle that can be drained for
//! [`RawInputEvent`]s. Backends (the Linux evdev reader, the virtual backend)
//! implement it; the [`DeviceManager`](crate::manager::DeviceManager) owns the
//! instances and hands out [`DeviceIdentity`] values to everyone else.
//!
//! ## Identity
//! [`DeviceId`] is a session-local counter assigned on first successful open.
//! It is never reused, even after the device is unplugged, so a stale id can
//! only ever resolve to "unknown device".

use crate::error::DeviceLost;
use crate::event::RawInputEvent;
use serde::{Deserialize, Serialize};
use std::os::fd::RawFd;

/// Session-local device handle assigned by the manager.
pub type DeviceId = u32;

/// Range and dead zone of one analog axis, captured when the device is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCapability {
    /// Kernel axis code (`ABS_*`).
    pub control: u16,
    pub minimum: i32,
    pub maximum: i32,
    /// Resting value reported at open time.
    pub deadzone_center: i32,
    /// Flat region around the center that reads as zero.
    pub deadzone_radius: i32,
}

impl AxisCapability {
    /// Normalize a raw value into `[0, 1]` (trigger style, `minimum == 0`)
    /// or roughly `[-1, 1]` (centered style, with dead zone).
    ///
    /// The negative branch divides by `minimum + deadzone_negative`, which is
    /// not the mirror image of the positive branch. Devices in the field rely on
    /// the values this produces, so it stays as is.
    pub fn normalize(&self, raw: i32) -> f64 {
        let raw = f64::from(raw);
        let minimum = f64::from(self.minimum);
        let maximum = f64::from(self.maximum);

        if self.minimum == 0 {
            return raw / (maximum - minimum);
        }

        // Dead-zone edges can fall outside i32 for extreme ranges.
        let center = f64::from(self.deadzone_center);
        let radius = f64::from(self.deadzone_radius);
        let deadzone_positive = center + radius;
        let deadzone_negative = center - radius;

        if raw < deadzone_positive && raw > deadzone_negative {
            return 0.0;
        }
        if raw > deadzone_positive {
            return (raw - deadzone_positive) / (maximum - deadzone_positive);
        }
        if raw < deadzone_negative {
            return -(raw + deadzone_negative) / (minimum + deadzone_negative);
        }
        // Exactly on a dead-zone edge.
        0.0
    }
}

/// Stable identity of a connected device.
///
/// Shared (via `Arc`) between the manager, the events it republishes and the
/// aggregated state, so that axis ranges travel with the events that need them.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceIdentity {
    pub id: DeviceId,
    /// OS path the device was opened from, e.g. `/dev/input/event7`.
    pub device_node: String,
    /// Analog axes reported by the device. Never contains a `minimum == maximum` entry.
    pub axes: Vec<AxisCapability>,
}

impl DeviceIdentity {
    pub fn axis(&self, control: u16) -> Option<&AxisCapability> {
        self.axes.iter().find(|a| a.control == control)
    }

    pub fn has_axis(&self, control: u16) -> bool {
        self.axis(control).is_some()
    }
}

/// Result of draining a device once.
///
/// `events` holds everything decoded before the drain stopped. When `lost` is
/// set the device must be closed; the events are still valid and are delivered.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub events: Vec<RawInputEvent>,
    pub lost: Option<DeviceLost>,
}

impl ReadOutcome {
    pub fn events(events: Vec<RawInputEvent>) -> Self {
        Self { events, lost: None }
    }
}

/// One open input device.
pub trait Device {
    /// Drain everything that is immediately available. Never blocks.
    fn poll(&mut self) -> ReadOutcome;

    /// Path the device was opened from.
    fn path(&self) -> &str;

    /// Analog axis capabilities, captured at open time.
    fn axes(&self) -> &[AxisCapability];

    /// File descriptor to watch for readability, if the device has one.
    fn raw_fd(&self) -> Option<RawFd> {
        None
    }
}
