//! End-to-end behaviour over the virtual backend.
#![cfg(feature = "virtual")]

use stickpad::backends::virtual_input::{VirtualBackend, VirtualController};
use stickpad::binding::InputSource;
use stickpad::config::Config;
use stickpad::device::AxisCapability;
use stickpad::event::Notification;
use stickpad::eventbus::{EventFilter, Recorder};
use stickpad::hub::InputHub;
use evdev::{AbsoluteAxisCode, KeyCode};

const ABS_X: u16 = AbsoluteAxisCode::ABS_X.0;
const BTN_EAST: u16 = KeyCode::BTN_EAST.0;
const BTN_SOUTH: u16 = KeyCode::BTN_SOUTH.0;

fn stick() -> Vec<AxisCapability> {
    vec![AxisCapability {
        control: ABS_X,
        minimum: -32768,
        maximum: 32767,
        deadzone_center: 0,
        deadzone_radius: 256,
    }]
}

fn start() -> (InputHub, VirtualController, Recorder) {
    let (backend, pad) = VirtualBackend::new();
    let mut hub = InputHub::new(Box::new(backend), &Config::default());
    let recorder = Recorder::new();
    hub.bus_mut()
        .add_listener(recorder.clone(), EventFilter::All, None);
    (hub, pad, recorder)
}

fn gamepad_devices(seen: &[Notification]) -> Vec<u32> {
    seen.iter()
        .filter_map(|n| match n {
            Notification::Gamepad(ev) => Some(ev.device_id()),
            _ => None,
        })
        .collect()
}

#[test]
fn hotplugged_pad_is_tracked_and_queried() {
    let (mut hub, pad, recorder) = start();
    pad.connect("virtual:pad", stick());
    hub.poll();
    assert!(matches!(
        recorder.drain().as_slice(),
        [Notification::DeviceConnected { device: 0 }]
    ));

    pad.set_axis("virtual:pad", ABS_X, 32767);
    pad.press_button("virtual:pad", BTN_SOUTH);
    hub.poll();

    assert_eq!(hub.state().query_gamepad_axis(ABS_X, 0), 1.0);
    assert!(hub.state().query_gamepad_button(BTN_SOUTH, 0));
    let updates = recorder
        .drain()
        .iter()
        .filter(|n| matches!(n, Notification::StateUpdated))
        .count();
    assert_eq!(updates, 2);
}

#[test]
fn events_queued_before_removal_are_never_delivered() {
    let (mut hub, pad, recorder) = start();
    pad.connect("virtual:pad", stick());
    hub.poll();

    pad.press_button("virtual:pad", BTN_SOUTH);
    pad.disconnect("virtual:pad");
    hub.poll();
    pad.press_button("virtual:pad", BTN_EAST);
    hub.poll();

    let seen = recorder.drain();
    assert!(gamepad_devices(&seen).is_empty());
    assert!(seen
        .iter()
        .any(|n| matches!(n, Notification::DeviceDisconnected { device: 0 })));
}

#[test]
fn reconnected_pad_gets_a_fresh_id_and_clean_state() {
    let (mut hub, pad, _recorder) = start();
    pad.connect("virtual:pad", stick());
    hub.poll();
    pad.press_button("virtual:pad", BTN_SOUTH);
    hub.poll();

    pad.disconnect("virtual:pad");
    hub.poll();
    assert!(!hub.state().query_gamepad_button(BTN_SOUTH, 0));
    assert!(hub.state().device_ids().is_empty());

    pad.connect("virtual:pad", stick());
    hub.poll();
    assert_eq!(hub.manager().id_for_path("virtual:pad"), Some(1));
    assert!(!hub.state().query_gamepad_button(BTN_SOUTH, 1));
}

#[test]
fn lost_device_is_torn_down_like_a_removal() {
    let (mut hub, pad, recorder) = start();
    pad.connect("virtual:pad", stick());
    hub.poll();

    pad.press_button("virtual:pad", BTN_SOUTH);
    pad.lose("virtual:pad");
    hub.on_device_ready(0);

    let seen = recorder.drain();
    assert_eq!(gamepad_devices(&seen), vec![0]);
    assert!(seen
        .iter()
        .any(|n| matches!(n, Notification::DeviceDisconnected { device: 0 })));
    assert!(hub.manager().is_empty());
    assert!(hub.state().device_ids().is_empty());
}

#[test]
fn unopenable_devices_are_skipped() {
    let (mut hub, pad, recorder) = start();
    pad.deny("virtual:locked");
    pad.connect("virtual:locked", stick());
    pad.connect("virtual:pad", stick());
    hub.poll();

    assert_eq!(hub.manager().id_for_path("virtual:locked"), None);
    assert_eq!(hub.manager().id_for_path("virtual:pad"), Some(0));
    assert_eq!(recorder.len(), 1);
}

#[test]
fn devices_are_isolated_from_each_other() {
    let (mut hub, pad, _recorder) = start();
    pad.connect("virtual:a", stick());
    pad.connect("virtual:b", stick());
    hub.poll();

    pad.press_button("virtual:b", BTN_SOUTH);
    hub.poll();
    assert!(!hub.state().query_gamepad_button(BTN_SOUTH, 0));
    assert!(hub.state().query_gamepad_button(BTN_SOUTH, 1));
}

#[test]
fn held_monitored_action_activates_once() {
    let (mut hub, pad, recorder) = start();
    pad.connect("virtual:pad", stick());
    hub.poll();
    hub.bindings_mut().add_action(
        "fire",
        InputSource::GamepadButton {
            button: BTN_SOUTH,
            controller: 0,
        },
    );
    hub.monitor_action("fire");
    recorder.drain();

    pad.press_button("virtual:pad", BTN_SOUTH);
    for _ in 0..4 {
        pad.repeat_button("virtual:pad", BTN_SOUTH);
    }
    hub.poll();

    let seen = recorder.drain();
    let updates = seen
        .iter()
        .filter(|n| matches!(n, Notification::StateUpdated))
        .count();
    assert_eq!(updates, 5);
    let actions: Vec<_> = seen
        .iter()
        .filter(|n| EventFilter::ActionsOnly.accepts(n))
        .collect();
    assert!(matches!(
        actions.as_slice(),
        [Notification::ActionActivated(name)] if name == "fire"
    ));
}

#[test]
fn axis_action_tracks_the_stick() {
    let (mut hub, pad, _recorder) = start();
    pad.connect("virtual:pad", stick());
    hub.poll();
    hub.bindings_mut().add_action(
        "steer",
        InputSource::GamepadAxis {
            axis: ABS_X,
            controller: 0,
        },
    );

    pad.set_axis("virtual:pad", ABS_X, 100);
    hub.poll();
    assert_eq!(hub.check_axis_action("steer"), 0.0);

    pad.set_axis("virtual:pad", ABS_X, 32767);
    hub.poll();
    assert_eq!(hub.check_axis_action("steer"), 1.0);
}

#[test]
fn snapshot_follows_the_pipeline() {
    let (mut hub, pad, _recorder) = start();
    pad.connect("virtual:pad", stick());
    hub.poll();
    pad.press_button("virtual:pad", BTN_EAST);
    hub.poll();

    let snap = hub.state().snapshot();
    assert!(snap.get(0).is_some_and(|pad| pad.get_button(BTN_EAST)));
    assert!(snap.to_json().is_ok());
}
