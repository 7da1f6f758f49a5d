//! Point-in-time copy of the aggregated input state.
//!
//! [`Snapshot`] is an **owned**, read-only view produced by
//! [`InputState::snapshot`](crate::state::InputState::snapshot). It does not
//! track later changes; take a new one after the next poll.
//!
//! Snapshots serialize with serde, which makes them handy for debugging
//! overlays and for logging a frame of input:
//! ```
//! use stickpad::state::InputState;
//!
//! let snap = InputState::new().snapshot();
//! assert!(snap.to_json().unwrap().contains("\"devices\""));
//! ```

use crate::device::DeviceId;
use crate::event::{Modifiers, MouseButtons};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// State of one gamepad at snapshot time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub device_node: String,
    /// Buttons held, hat directions included.
    pub buttons: BTreeSet<u16>,
    /// Normalized value per reported axis.
    pub axes: BTreeMap<u16, f64>,
}

impl DeviceState {
    /// Value of an axis (0.0 if missing).
    pub fn get_axis(&self, axis: u16) -> f64 {
        self.axes.get(&axis).copied().unwrap_or(0.0)
    }

    /// Whether a button is held (false if missing).
    pub fn get_button(&self, button: u16) -> bool {
        self.buttons.contains(&button)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub devices: BTreeMap<DeviceId, DeviceState>,
    pub mouse_position: (f64, f64),
    pub mouse_buttons: MouseButtons,
    pub modifiers: Modifiers,
}

impl Snapshot {
    #[inline]
    pub fn get(&self, id: DeviceId) -> Option<&DeviceState> {
        self.devices.get(&id)
    }

    /// Iterate `(id, state)` pairs in id order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&DeviceId, &DeviceState)> {
        self.devices.iter()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
