//! The input pipeline in one place.
//!
//! [`InputHub`] owns a [`DeviceManager`], the aggregated [`InputState`], the
//! [`KeyBindings`] table and an [`InputEventBus`]. Every input it receives is
//! applied to state and then published, in this order:
//!
//! 1. the input itself ([`Notification::Gamepad`], connect/disconnect)
//! 2. any button edges it caused
//! 3. [`Notification::StateUpdated`]
//! 4. edges of monitored actions
//!
//! ```
//! use stickpad::backends::virtual_input::VirtualBackend;
//! use stickpad::binding::InputSource;
//! use stickpad::config::Config;
//! use stickpad::eventbus::{EventFilter, Recorder};
//! use stickpad::hub::InputHub;
//!
//! let (backend, pad) = VirtualBackend::new();
//! pad.insert("virtual:0", Vec::new());
//! let mut hub = InputHub::new(Box::new(backend), &Config::default());
//!
//! hub.bindings_mut().add_action("jump", InputSource::GamepadButton { button: 0x130, controller: 0 });
//! hub.monitor_action("jump");
//! let actions = Recorder::new();
//! hub.bus_mut().add_listener(actions.clone(), EventFilter::ActionsOnly, None);
//!
//! pad.press_button("virtual:0", 0x130);
//! hub.poll();
//! assert_eq!(hub.check_action("jump"), 1.0);
//! assert_eq!(actions.len(), 1);
//! ```

use crate::backends::Backend;
use crate::binding::KeyBindings;
use crate::config::Config;
use crate::device::DeviceId;
use crate::event::{KeyEvent, Modifiers, MouseEvent, Notification};
use crate::eventbus::InputEventBus;
use crate::manager::{DeviceManager, ManagerEvent, ReadySource};
use crate::state::InputState;
use std::os::fd::RawFd;

pub struct InputHub {
    manager: DeviceManager,
    state: InputState,
    bindings: KeyBindings,
    bus: InputEventBus,
}

impl InputHub {
    /// Open every present device and load the configured binding profiles.
    pub fn new(backend: Box<dyn Backend>, config: &Config) -> Self {
        let mut bindings = KeyBindings::new();
        for profile in &config.bindings {
            bindings.apply_profile(profile);
        }

        Self {
            manager: DeviceManager::new(backend),
            state: InputState::new(),
            bindings,
            bus: InputEventBus::new(),
        }
    }

    /// Drain hotplug and every device.
    pub fn poll(&mut self) {
        let events = self.manager.poll_events();
        self.dispatch(events);
    }

    /// Call when the hotplug descriptor becomes readable.
    pub fn on_hotplug_ready(&mut self) {
        let events = self.manager.process_hotplug();
        self.dispatch(events);
    }

    /// Call when device `id`'s descriptor becomes readable.
    pub fn on_device_ready(&mut self, id: DeviceId) {
        let events = self.manager.process_device(id);
        self.dispatch(events);
    }

    /// Route a readiness notification for one of [`readiness_sources`](Self::readiness_sources).
    pub fn on_ready(&mut self, source: ReadySource) {
        match source {
            ReadySource::Hotplug => self.on_hotplug_ready(),
            ReadySource::Device(id) => self.on_device_ready(id),
        }
    }

    pub fn readiness_sources(&self) -> Vec<(ReadySource, RawFd)> {
        self.manager.readiness_sources()
    }

    pub fn key_press(&mut self, key: u32, modifiers: Modifiers) {
        self.key_event(KeyEvent {
            key,
            pressed: true,
            modifiers,
        });
    }

    pub fn key_release(&mut self, key: u32, modifiers: Modifiers) {
        self.key_event(KeyEvent {
            key,
            pressed: false,
            modifiers,
        });
    }

    fn key_event(&mut self, event: KeyEvent) {
        self.state.process_key_event(event);
        self.state_updated();
    }

    pub fn mouse_event(&mut self, event: MouseEvent) {
        self.state.process_mouse_event(event);
        self.state_updated();
    }

    /// Current value of `action`, see [`KeyBindings::check_action`].
    pub fn check_action(&self, action: &str) -> f64 {
        self.bindings.check_action(action, &self.state)
    }

    pub fn check_axis_action(&self, action: &str) -> f64 {
        self.bindings.check_axis_action(action, &self.state)
    }

    /// Start publishing edges for `action`, using its current value as baseline.
    pub fn monitor_action(&mut self, action: &str) {
        self.bindings.register_monitored_action(action, &self.state);
    }

    pub fn unmonitor_action(&mut self, action: &str) {
        self.bindings.deregister_monitored_action(action);
    }

    pub fn state(&self) -> &InputState {
        &self.state
    }

    pub fn manager(&self) -> &DeviceManager {
        &self.manager
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    pub fn bus_mut(&mut self) -> &mut InputEventBus {
        &mut self.bus
    }

    fn dispatch(&mut self, events: Vec<ManagerEvent>) {
        for event in events {
            match event {
                ManagerEvent::Connected(identity) => {
                    self.bus.emit(&Notification::DeviceConnected {
                        device: identity.id,
                    });
                }
                ManagerEvent::Disconnected(identity) => {
                    self.state.remove_device(identity.id);
                    self.bus.emit(&Notification::DeviceDisconnected {
                        device: identity.id,
                    });
                    self.state_updated();
                }
                ManagerEvent::Input(event) => {
                    let changes = self.state.process_gamepad_event(&event);
                    self.bus.emit(&Notification::Gamepad(event));
                    for change in changes {
                        self.bus.emit(&change.into());
                    }
                    self.state_updated();
                }
            }
        }
    }

    fn state_updated(&mut self) {
        self.bus.emit(&Notification::StateUpdated);
        for edge in self.bindings.check_monitored_actions(&self.state) {
            self.bus.emit(&edge.into());
        }
    }
}

#[cfg(all(test, feature = "virtual"))]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualBackend;
    use crate::binding::InputSource;
    use crate::codes::hat;
    use evdev::{AbsoluteAxisCode, KeyCode};
    use crate::eventbus::{EventFilter, Recorder};
    use crate::logger::Logger;

    const ABS_HAT0Y: u16 = AbsoluteAxisCode::ABS_HAT0Y.0;
    const BTN_SOUTH: u16 = KeyCode::BTN_SOUTH.0;

    fn hub_with_pad() -> (InputHub, crate::backends::virtual_input::VirtualController, Recorder) {
        let (backend, pad) = VirtualBackend::new();
        pad.insert("virtual:0", Vec::new());
        let mut hub = InputHub::new(Box::new(backend), &Config::default());
        let recorder = Recorder::new();
        hub.bus_mut()
            .add_listener(recorder.clone(), EventFilter::All, None);
        hub.bus_mut().add_listener(Logger::new(), EventFilter::All, None);
        hub.poll();
        recorder.drain();
        (hub, pad, recorder)
    }

    #[test]
    fn publish_order_per_event() {
        let (mut hub, pad, recorder) = hub_with_pad();
        hub.bindings_mut().add_action(
            "jump",
            InputSource::GamepadButton {
                button: BTN_SOUTH,
                controller: 0,
            },
        );
        hub.monitor_action("jump");

        pad.press_button("virtual:0", BTN_SOUTH);
        hub.poll();

        let seen = recorder.drain();
        assert!(matches!(seen[0], Notification::Gamepad(_)));
        assert!(matches!(
            seen[1],
            Notification::ButtonPressed {
                button: BTN_SOUTH,
                device: 0
            }
        ));
        assert!(matches!(seen[2], Notification::StateUpdated));
        assert!(matches!(&seen[3], Notification::ActionActivated(name) if name == "jump"));
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn hat_directions_are_published_as_buttons() {
        let (mut hub, pad, recorder) = hub_with_pad();
        pad.set_hat("virtual:0", ABS_HAT0Y, -1);
        hub.poll();

        let up = hat::button(0, hat::UP);
        assert!(hub.state().query_gamepad_button(up, 0));
        assert!(recorder.drain().iter().any(|n| matches!(
            n,
            Notification::ButtonPressed { button, device: 0 } if *button == up
        )));
    }

    #[test]
    fn keyboard_input_drives_actions() {
        let (mut hub, _pad, recorder) = hub_with_pad();
        hub.bindings_mut().add_action(
            "run",
            InputSource::Key {
                key: 42,
                modifiers: Modifiers::empty(),
            },
        );
        hub.monitor_action("run");

        hub.key_press(42, Modifiers::empty());
        hub.key_release(42, Modifiers::empty());

        let actions: Vec<_> = recorder
            .drain()
            .into_iter()
            .filter(|n| EventFilter::ActionsOnly.accepts(n))
            .collect();
        assert!(matches!(&actions[..], [
            Notification::ActionActivated(a),
            Notification::ActionDeactivated(d),
        ] if a == "run" && d == "run"));
    }

    #[test]
    fn unplugging_deactivates_bound_actions() {
        let (mut hub, pad, recorder) = hub_with_pad();
        hub.bindings_mut().add_action(
            "jump",
            InputSource::GamepadButton {
                button: BTN_SOUTH,
                controller: 0,
            },
        );
        pad.press_button("virtual:0", BTN_SOUTH);
        hub.poll();
        hub.monitor_action("jump");
        recorder.drain();

        pad.disconnect("virtual:0");
        hub.poll();

        let seen = recorder.drain();
        assert!(matches!(seen[0], Notification::DeviceDisconnected { device: 0 }));
        assert!(matches!(seen[1], Notification::StateUpdated));
        assert!(matches!(&seen[2], Notification::ActionDeactivated(name) if name == "jump"));
        assert!(!hub.state().query_gamepad_button(BTN_SOUTH, 0));
    }

    #[test]
    fn configured_profiles_are_loaded() {
        let config = Config::from_toml_str(
            r#"
            [[bindings]]
            name = "default"

            [[bindings.bindings]]
            action = "jump"
            source = { GamepadButton = { button = 304, controller = 0 } }
            "#,
        )
        .unwrap();
        let (backend, pad) = VirtualBackend::new();
        pad.insert("virtual:0", Vec::new());
        let mut hub = InputHub::new(Box::new(backend), &config);

        pad.press_button("virtual:0", BTN_SOUTH);
        hub.poll();
        assert_eq!(hub.check_action("jump"), 1.0);
        assert_eq!(hub.bindings().actions(), vec!["jump"]);
    }
}
