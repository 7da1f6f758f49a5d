//! Named actions bound to physical inputs.
//!
//! A binding says "action `jump` is satisfied by gamepad button 304 on
//! controller 0". Many bindings can share a name; they are tried in insertion
//! order and the first satisfied one decides the value.
use crate::device::DeviceId;
use crate::error::ActionQueryError;
use crate::event::{ActionEdge, Modifiers, MouseButtons};
use crate::state::InputState;
use log::warn;
use serde::{Deserialize, Serialize};

/// Physical input an action can be bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputSource {
    /// Host key code, with the modifiers that must also be held.
    Key {
        key: u32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Every listed mouse button must be held.
    MouseButton {
        buttons: MouseButtons,
        #[serde(default)]
        modifiers: Modifiers,
    },
    GamepadButton { button: u16, controller: DeviceId },
    /// Evaluates to the normalized axis value.
    GamepadAxis { axis: u16, controller: DeviceId },
}

impl InputSource {
    pub fn is_axis(&self) -> bool {
        matches!(self, InputSource::GamepadAxis { .. })
    }
}

/// Maps a source to a named action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub action: String,
    pub source: InputSource,
}

/// Serializable profile of input bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingProfile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub bindings: Vec<KeyBinding>,
}

#[derive(Debug, Clone, PartialEq)]
struct MonitoredAction {
    action: String,
    last_value: f64,
}

/// Binding table plus the set of actions watched for edges.
#[derive(Debug, Default)]
pub struct KeyBindings {
    bindings: Vec<KeyBinding>,
    monitored: Vec<MonitoredAction>,
}

impl KeyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: impl Into<String>, source: InputSource) {
        self.bindings.push(KeyBinding {
            action: action.into(),
            source,
        });
    }

    /// Append every binding of `profile`.
    pub fn apply_profile(&mut self, profile: &BindingProfile) {
        log::debug!(
            "applying binding profile '{}' ({} bindings)",
            profile.name,
            profile.bindings.len()
        );
        self.bindings.extend(profile.bindings.iter().cloned());
    }

    /// Distinct action names, in first-binding order.
    pub fn actions(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for binding in &self.bindings {
            if !names.contains(&binding.action.as_str()) {
                names.push(&binding.action);
            }
        }
        names
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Current value of `action`: `1.0` for a satisfied digital source, the
    /// normalized value for an axis source, `0.0` when nothing matches.
    pub fn check_action(&self, action: &str, state: &InputState) -> f64 {
        for binding in self.bindings.iter().filter(|b| b.action == action) {
            match binding.source {
                InputSource::Key { key, modifiers } => {
                    if state.query_key(key) && state.keyboard_modifiers().contains(modifiers) {
                        return 1.0;
                    }
                }
                InputSource::MouseButton { buttons, modifiers } => {
                    if state.mouse_buttons().contains(buttons)
                        && state.keyboard_modifiers().contains(modifiers)
                    {
                        return 1.0;
                    }
                }
                InputSource::GamepadButton { button, controller } => {
                    if state.query_gamepad_button(button, controller) {
                        return 1.0;
                    }
                }
                InputSource::GamepadAxis { axis, controller } => {
                    return state.query_gamepad_axis(axis, controller);
                }
            }
        }
        0.0
    }

    /// Normalized value of an axis action.
    ///
    /// The first binding for `action` must be an axis source; otherwise the
    /// query is rejected with a warning and `0.0` is returned.
    pub fn check_axis_action(&self, action: &str, state: &InputState) -> f64 {
        match self.axis_source(action) {
            Ok((axis, controller)) => state.query_gamepad_axis(axis, controller),
            Err(e) => {
                warn!("{e}");
                0.0
            }
        }
    }

    fn axis_source(&self, action: &str) -> Result<(u16, DeviceId), ActionQueryError> {
        let first = self
            .bindings
            .iter()
            .find(|b| b.action == action)
            .ok_or_else(|| ActionQueryError::UnknownAction(action.to_string()))?;
        match first.source {
            InputSource::GamepadAxis { axis, controller } => Ok((axis, controller)),
            _ => Err(ActionQueryError::NotAnAxis(action.to_string())),
        }
    }

    /// Drop every binding and every monitored action.
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.monitored.clear();
    }

    /// Start watching `action` for edges. The current value becomes the baseline.
    pub fn register_monitored_action(&mut self, action: &str, state: &InputState) {
        if self.is_monitored(action) {
            return;
        }
        let last_value = self.check_action(action, state);
        self.monitored.push(MonitoredAction {
            action: action.to_string(),
            last_value,
        });
    }

    pub fn deregister_monitored_action(&mut self, action: &str) {
        self.monitored.retain(|m| m.action != action);
    }

    pub fn is_monitored(&self, action: &str) -> bool {
        self.monitored.iter().any(|m| m.action == action)
    }

    /// Re-evaluate monitored actions, in registration order. Every change of
    /// value is reported: `Activated` when the new value is nonzero,
    /// `Deactivated` when it is zero.
    pub fn check_monitored_actions(&mut self, state: &InputState) -> Vec<ActionEdge> {
        let mut edges = Vec::new();
        for index in 0..self.monitored.len() {
            let value = self.check_action(&self.monitored[index].action, state);
            let monitored = &mut self.monitored[index];
            if value == monitored.last_value {
                continue;
            }
            edges.push(if value != 0.0 {
                ActionEdge::Activated(monitored.action.clone())
            } else {
                ActionEdge::Deactivated(monitored.action.clone())
            });
            monitored.last_value = value;
        }
        edges
    }
}
