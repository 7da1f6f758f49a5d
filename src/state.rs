//! Aggregated input state.
//!
//! [`InputState`] folds gamepad events and host keyboard/mouse events into
//! current-value tables and answers point queries against them. It does not
//! publish anything itself: the mutating methods return what changed and the
//! [`InputHub`](crate::hub::InputHub) turns that into notifications.

use crate::codes::{self, hat};
use crate::device::{DeviceId, DeviceIdentity};
use crate::event::{
    ButtonChange, ButtonEdge, EventKind, GamepadEvent, KeyEvent, Modifiers, MouseButtons,
    MouseEvent,
};
use crate::snapshot::{DeviceState, Snapshot};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Current state of one gamepad.
#[derive(Debug, Clone)]
pub struct GamepadState {
    identity: Arc<DeviceIdentity>,
    buttons: HashMap<u16, bool>,
    /// Raw values, only for axes the device reported a capability for.
    axes: HashMap<u16, i32>,
}

impl GamepadState {
    fn new(identity: Arc<DeviceIdentity>) -> Self {
        Self {
            identity,
            buttons: HashMap::new(),
            axes: HashMap::new(),
        }
    }

    pub fn identity(&self) -> &Arc<DeviceIdentity> {
        &self.identity
    }

    pub fn button(&self, button: u16) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }

    pub fn raw_axis(&self, axis: u16) -> Option<i32> {
        self.axes.get(&axis).copied()
    }

    pub fn axis(&self, axis: u16) -> f64 {
        match (self.identity.axis(axis), self.raw_axis(axis)) {
            (Some(capability), Some(raw)) => capability.normalize(raw),
            _ => 0.0,
        }
    }

    /// Set a button and report the edge, if any.
    fn set_button(&mut self, button: u16, pressed: bool) -> Option<ButtonChange> {
        let previous = self.buttons.insert(button, pressed).unwrap_or(false);
        if previous == pressed {
            return None;
        }
        Some(ButtonChange {
            button,
            device: self.identity.id,
            edge: if pressed {
                ButtonEdge::Pressed
            } else {
                ButtonEdge::Released
            },
        })
    }

    /// Decompose one hat channel into its two direction buttons.
    fn set_hat(&mut self, control: u16, value: i32) -> Vec<ButtonChange> {
        let Some(channel) = hat::channel(control) else {
            return Vec::new();
        };
        let (negative, positive) = channel.buttons();

        // Release before press so both directions are never held at once.
        let (release, press) = match value {
            1 => (negative, Some(positive)),
            -1 => (positive, Some(negative)),
            _ => (negative, None),
        };

        let mut changes = Vec::new();
        changes.extend(self.set_button(release, false));
        match press {
            Some(button) => changes.extend(self.set_button(button, true)),
            None => changes.extend(self.set_button(positive, false)),
        }
        changes
    }
}

/// Current keyboard, mouse and gamepad state.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    mouse_position: (f64, f64),
    mouse_buttons: MouseButtons,
    modifiers: Modifiers,
    keys: HashMap<u32, bool>,
    gamepads: BTreeMap<DeviceId, GamepadState>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one gamepad event. Returns the button edges it caused, hat
    /// directions included.
    pub fn process_gamepad_event(&mut self, event: &GamepadEvent) -> Vec<ButtonChange> {
        let pad = self
            .gamepads
            .entry(event.device_id())
            .or_insert_with(|| GamepadState::new(event.device.clone()));

        match event.kind {
            EventKind::Button => pad
                .set_button(event.control, event.value != 0)
                .into_iter()
                .collect(),
            EventKind::Hat if codes::is_hat(event.control) => {
                pad.set_hat(event.control, event.value)
            }
            EventKind::Axis | EventKind::Hat => {
                if pad.identity.has_axis(event.control) {
                    pad.axes.insert(event.control, event.value);
                }
                Vec::new()
            }
            EventKind::Ball => Vec::new(),
        }
    }

    pub fn process_key_event(&mut self, event: KeyEvent) {
        self.keys.insert(event.key, event.pressed);
        self.modifiers = event.modifiers;
    }

    pub fn process_mouse_event(&mut self, event: MouseEvent) {
        self.mouse_position = event.position;
        self.mouse_buttons = event.buttons;
        self.modifiers = event.modifiers;
    }

    /// Forget everything about a device. Returns whether it was known.
    pub fn remove_device(&mut self, id: DeviceId) -> bool {
        self.gamepads.remove(&id).is_some()
    }

    pub fn query_key(&self, key: u32) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    pub fn keyboard_modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn mouse_buttons(&self) -> MouseButtons {
        self.mouse_buttons
    }

    pub fn mouse_position(&self) -> (f64, f64) {
        self.mouse_position
    }

    /// `false` for unknown devices and buttons.
    pub fn query_gamepad_button(&self, button: u16, id: DeviceId) -> bool {
        self.gamepads.get(&id).is_some_and(|pad| pad.button(button))
    }

    /// Normalized axis value, or `0.0` for unknown devices and axes.
    ///
    /// See [`AxisCapability::normalize`](crate::device::AxisCapability::normalize).
    pub fn query_gamepad_axis(&self, axis: u16, id: DeviceId) -> f64 {
        self.gamepads.get(&id).map_or(0.0, |pad| pad.axis(axis))
    }

    pub fn raw_gamepad_axis(&self, axis: u16, id: DeviceId) -> Option<i32> {
        self.gamepads.get(&id).and_then(|pad| pad.raw_axis(axis))
    }

    pub fn gamepad(&self, id: DeviceId) -> Option<&GamepadState> {
        self.gamepads.get(&id)
    }

    /// Devices that have produced at least one event and not been removed.
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.gamepads.keys().copied().collect()
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        let devices = self
            .gamepads
            .iter()
            .map(|(id, pad)| {
                let state = DeviceState {
                    device_node: pad.identity.device_node.clone(),
                    buttons: pad
                        .buttons
                        .iter()
                        .filter(|(_, pressed)| **pressed)
                        .map(|(button, _)| *button)
                        .collect(),
                    axes: pad
                        .axes
                        .keys()
                        .map(|axis| (*axis, pad.axis(*axis)))
                        .collect(),
                };
                (*id, state)
            })
            .collect();

        Snapshot {
            devices,
            mouse_position: self.mouse_position,
            mouse_buttons: self.mouse_buttons,
            modifiers: self.modifiers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evdev::{AbsoluteAxisCode, KeyCode, RelativeAxisCode};
    use crate::device::AxisCapability;
    use crate::event::RawInputEvent;

    const ABS_HAT0X: u16 = AbsoluteAxisCode::ABS_HAT0X.0;
    const ABS_HAT0Y: u16 = AbsoluteAxisCode::ABS_HAT0Y.0;
    const ABS_HAT2X: u16 = AbsoluteAxisCode::ABS_HAT2X.0;
    const ABS_HAT3X: u16 = AbsoluteAxisCode::ABS_HAT3X.0;
    const ABS_X: u16 = AbsoluteAxisCode::ABS_X.0;
    const ABS_Y: u16 = AbsoluteAxisCode::ABS_Y.0;
    const ABS_Z: u16 = AbsoluteAxisCode::ABS_Z.0;
    const BTN_SOUTH: u16 = KeyCode::BTN_SOUTH.0;
    const REL_X: u16 = RelativeAxisCode::REL_X.0;

    fn identity(id: DeviceId) -> Arc<DeviceIdentity> {
        Arc::new(DeviceIdentity {
            id,
            device_node: format!("virtual:{id}"),
            axes: vec![
                AxisCapability {
                    control: ABS_X,
                    minimum: -32768,
                    maximum: 32767,
                    deadzone_center: 0,
                    deadzone_radius: 128,
                },
                AxisCapability {
                    control: ABS_Z,
                    minimum: 0,
                    maximum: 255,
                    deadzone_center: 0,
                    deadzone_radius: 0,
                },
            ],
        })
    }

    fn event(id: DeviceId, kind: EventKind, control: u16, value: i32) -> GamepadEvent {
        GamepadEvent::new(
            identity(id),
            RawInputEvent {
                time: 0,
                kind,
                control,
                value,
            },
        )
    }

    fn edges(changes: &[ButtonChange]) -> Vec<(u16, ButtonEdge)> {
        changes.iter().map(|c| (c.button, c.edge)).collect()
    }

    #[test]
    fn button_edges_fire_only_on_change() {
        let mut state = InputState::new();
        let press = state.process_gamepad_event(&event(0, EventKind::Button, BTN_SOUTH, 1));
        assert_eq!(edges(&press), vec![(BTN_SOUTH, ButtonEdge::Pressed)]);

        let repeat = state.process_gamepad_event(&event(0, EventKind::Button, BTN_SOUTH, 2));
        assert!(repeat.is_empty());
        assert!(state.query_gamepad_button(BTN_SOUTH, 0));

        let release = state.process_gamepad_event(&event(0, EventKind::Button, BTN_SOUTH, 0));
        assert_eq!(edges(&release), vec![(BTN_SOUTH, ButtonEdge::Released)]);
        assert!(!state.query_gamepad_button(BTN_SOUTH, 0));
    }

    #[test]
    fn hat_sequence_moves_between_directions() {
        let mut state = InputState::new();
        let right = hat::button(0, hat::RIGHT);
        let left = hat::button(0, hat::LEFT);

        let mut seen = Vec::new();
        for value in [0, 1, 0, -1, 0] {
            let changes = state.process_gamepad_event(&event(0, EventKind::Hat, ABS_HAT0X, value));
            seen.extend(edges(&changes));
            assert!(!(state.query_gamepad_button(right, 0) && state.query_gamepad_button(left, 0)));
        }

        assert_eq!(
            seen,
            vec![
                (right, ButtonEdge::Pressed),
                (right, ButtonEdge::Released),
                (left, ButtonEdge::Pressed),
                (left, ButtonEdge::Released),
            ]
        );
    }

    #[test]
    fn hat_can_flip_without_passing_through_center() {
        let mut state = InputState::new();
        let up = hat::button(0, hat::UP);
        let down = hat::button(0, hat::DOWN);

        state.process_gamepad_event(&event(0, EventKind::Hat, ABS_HAT0Y, -1));
        let flip = state.process_gamepad_event(&event(0, EventKind::Hat, ABS_HAT0Y, 1));
        assert_eq!(
            edges(&flip),
            vec![(up, ButtonEdge::Released), (down, ButtonEdge::Pressed)]
        );
    }

    #[test]
    fn hat_buttons_are_laid_out_per_pair() {
        assert_eq!(hat::button(0, hat::UP), 0x255);
        assert_eq!(hat::button(1, hat::RIGHT), 0x255 + 4 + 3);

        let mut state = InputState::new();
        let changes = state.process_gamepad_event(&event(0, EventKind::Hat, ABS_HAT2X, 1));
        assert_eq!(edges(&changes), vec![(hat::button(2, hat::RIGHT), ButtonEdge::Pressed)]);
    }

    #[test]
    fn fourth_hat_is_ignored() {
        let mut state = InputState::new();
        assert!(state
            .process_gamepad_event(&event(0, EventKind::Hat, ABS_HAT3X, 1))
            .is_empty());
    }

    #[test]
    fn axes_are_normalized_on_query() {
        let mut state = InputState::new();
        state.process_gamepad_event(&event(0, EventKind::Axis, ABS_X, 129));
        state.process_gamepad_event(&event(0, EventKind::Axis, ABS_Z, 255));

        assert_eq!(state.query_gamepad_axis(ABS_X, 0), 1.0 / (32767.0 - 128.0));
        assert_eq!(state.query_gamepad_axis(ABS_Z, 0), 1.0);
        assert_eq!(state.raw_gamepad_axis(ABS_X, 0), Some(129));
    }

    #[test]
    fn unknown_axes_and_devices_read_zero() {
        let mut state = InputState::new();
        state.process_gamepad_event(&event(0, EventKind::Axis, ABS_Y, 5000));

        assert_eq!(state.raw_gamepad_axis(ABS_Y, 0), None);
        assert_eq!(state.query_gamepad_axis(ABS_Y, 0), 0.0);
        assert_eq!(state.query_gamepad_axis(ABS_X, 7), 0.0);
        assert!(!state.query_gamepad_button(BTN_SOUTH, 7));
    }

    #[test]
    fn balls_change_nothing() {
        let mut state = InputState::new();
        assert!(state
            .process_gamepad_event(&event(0, EventKind::Ball, REL_X, 3))
            .is_empty());
        assert_eq!(state.raw_gamepad_axis(REL_X, 0), None);
    }

    #[test]
    fn removed_devices_are_purged() {
        let mut state = InputState::new();
        state.process_gamepad_event(&event(3, EventKind::Button, BTN_SOUTH, 1));
        assert_eq!(state.device_ids(), vec![3]);

        assert!(state.remove_device(3));
        assert!(!state.query_gamepad_button(BTN_SOUTH, 3));
        assert!(state.device_ids().is_empty());
        assert!(!state.remove_device(3));
    }

    #[test]
    fn keyboard_and_mouse_update_shared_modifiers() {
        let mut state = InputState::new();
        state.process_key_event(KeyEvent {
            key: 42,
            pressed: true,
            modifiers: Modifiers::SHIFT,
        });
        assert!(state.query_key(42));
        assert_eq!(state.keyboard_modifiers(), Modifiers::SHIFT);

        state.process_mouse_event(MouseEvent {
            position: (10.0, 20.0),
            buttons: MouseButtons::MIDDLE,
            modifiers: Modifiers::ALT,
        });
        assert_eq!(state.mouse_position(), (10.0, 20.0));
        assert_eq!(state.mouse_buttons(), MouseButtons::MIDDLE);
        assert_eq!(state.keyboard_modifiers(), Modifiers::ALT);

        state.process_key_event(KeyEvent {
            key: 42,
            pressed: false,
            modifiers: Modifiers::empty(),
        });
        assert!(!state.query_key(42));
    }
}
