//! Events and notifications.
//!
//! StickPad moves three kinds of values around:
//!
//! - [`RawInputEvent`]: one decoded kernel record from one device, produced by a
//!   [`Device`](crate::device::Device) and consumed immediately.
//! - [`GamepadEvent`]: the same record re-tagged by the manager with the
//!   device's [`DeviceIdentity`].
//! - [`Notification`]: what applications subscribe to on the
//!   [`InputEventBus`](crate::eventbus::InputEventBus).
//!
//! Keyboard and mouse input does not come from a device in this crate. The host
//! application forwards it as [`KeyEvent`] / [`MouseEvent`] snapshots.
//!
//! ## Value conventions
//! - **Buttons:** `0` = release, `1` = press, `2` = autorepeat (forwarded as is).
//! - **Axes:** raw device units; normalize through
//!   [`InputState::query_gamepad_axis`](crate::state::InputState::query_gamepad_axis).
//! - **Hats:** `-1`, `0`, `1` per channel (X and Y are separate events).
//! - **Balls:** relative counts.

use crate::device::{DeviceId, DeviceIdentity};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Classification of a decoded record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Button,
    Axis,
    Hat,
    Ball,
}

/// One decoded record from one device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawInputEvent {
    /// Device clock, microseconds.
    pub time: u64,
    pub kind: EventKind,
    /// Kernel code (`BTN_*`, `ABS_*`, `REL_*`).
    pub control: u16,
    pub value: i32,
}

/// A [`RawInputEvent`] tagged with the device it came from.
#[derive(Clone, Debug)]
pub struct GamepadEvent {
    pub device: Arc<DeviceIdentity>,
    pub time: u64,
    pub kind: EventKind,
    pub control: u16,
    pub value: i32,
}

impl GamepadEvent {
    pub fn new(device: Arc<DeviceIdentity>, raw: RawInputEvent) -> Self {
        Self {
            device,
            time: raw.time,
            kind: raw.kind,
            control: raw.control,
            value: raw.value,
        }
    }

    #[inline]
    pub fn device_id(&self) -> DeviceId {
        self.device.id
    }
}

bitflags! {
    /// Keyboard modifier state.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct Modifiers: u32 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
        const META = 1 << 3;
        const KEYPAD = 1 << 4;
    }
}

bitflags! {
    /// Set of mouse buttons.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MouseButtons: u32 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
        const BACK = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

/// Key press or release forwarded by the host application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Host key code. StickPad does not interpret it.
    pub key: u32,
    pub pressed: bool,
    /// Modifier state at the time of the event.
    pub modifiers: Modifiers,
}

/// Mouse snapshot forwarded by the host application on press, release or move.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseEvent {
    /// Window-relative position.
    pub position: (f64, f64),
    /// Buttons held after this event.
    pub buttons: MouseButtons,
    pub modifiers: Modifiers,
}

/// Which way a button moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonEdge {
    Pressed,
    Released,
}

/// A gamepad button changed state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonChange {
    pub button: u16,
    pub device: DeviceId,
    pub edge: ButtonEdge,
}

/// A monitored action crossed zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionEdge {
    Activated(String),
    Deactivated(String),
}

/// Everything published on the event bus.
#[derive(Clone, Debug)]
pub enum Notification {
    DeviceConnected { device: DeviceId },
    DeviceDisconnected { device: DeviceId },
    /// A gamepad event as read from the device.
    Gamepad(GamepadEvent),
    ButtonPressed { button: u16, device: DeviceId },
    ButtonReleased { button: u16, device: DeviceId },
    /// Published once after each processed event.
    StateUpdated,
    ActionActivated(String),
    ActionDeactivated(String),
}

impl Notification {
    /// Device the notification concerns, if any.
    pub fn device_id(&self) -> Option<DeviceId> {
        match self {
            Notification::DeviceConnected { device }
            | Notification::DeviceDisconnected { device }
            | Notification::ButtonPressed { device, .. }
            | Notification::ButtonReleased { device, .. } => Some(*device),
            Notification::Gamepad(event) => Some(event.device_id()),
            Notification::StateUpdated
            | Notification::ActionActivated(_)
            | Notification::ActionDeactivated(_) => None,
        }
    }
}

impl From<ButtonChange> for Notification {
    fn from(change: ButtonChange) -> Self {
        match change.edge {
            ButtonEdge::Pressed => Notification::ButtonPressed {
                button: change.button,
                device: change.device,
            },
            ButtonEdge::Released => Notification::ButtonReleased {
                button: change.button,
                device: change.device,
            },
        }
    }
}

impl From<ActionEdge> for Notification {
    fn from(edge: ActionEdge) -> Self {
        match edge {
            ActionEdge::Activated(name) => Notification::ActionActivated(name),
            ActionEdge::Deactivated(name) => Notification::ActionDeactivated(name),
        }
    }
}
