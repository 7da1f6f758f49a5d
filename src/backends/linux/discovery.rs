//! udev-based device discovery and hotplug monitoring.
//!
//! - [`HotplugMonitor::scan_connected_devices`] enumerates the input subsystem once,
//!   keeping joystick-class devices whose node looks like `/dev/input/event*`.
//! - [`HotplugMonitor::poll`] drains the udev monitor socket and reports arrivals
//!   and removals.
//!
//! If the monitor socket cannot be created the monitor keeps working in
//! enumeration-only mode and simply never reports hotplug events.

use crate::backends::HotplugEvent;
use crate::config::DiscoveryConfig;
use crate::error::DiscoveryError;
use log::{debug, info, warn};
use std::os::fd::{AsRawFd, RawFd};

/// What a udev notification asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Add,
    Remove,
    Other,
}

impl From<udev::EventType> for Action {
    fn from(event_type: udev::EventType) -> Self {
        match event_type {
            udev::EventType::Add => Action::Add,
            udev::EventType::Remove => Action::Remove,
            _ => Action::Other,
        }
    }
}

/// Decide whether a udev notification concerns a device StickPad should track.
///
/// Removals only need a matching node: the joystick property is not always
/// present once the device is gone, and removing an unknown path is harmless.
fn classify(
    action: Action,
    devnode: Option<&str>,
    is_joystick: bool,
    config: &DiscoveryConfig,
) -> Option<HotplugEvent> {
    let node = devnode.filter(|n| n.starts_with(&config.device_prefix))?;
    match action {
        Action::Add if is_joystick => Some(HotplugEvent::Detected(node.to_string())),
        Action::Remove => Some(HotplugEvent::Removed(node.to_string())),
        _ => None,
    }
}

fn is_joystick(device: &udev::Device, config: &DiscoveryConfig) -> bool {
    device
        .property_value(&config.joystick_property)
        .map(|v| v == "1")
        .unwrap_or(false)
}

/// Owns the udev monitor socket (when available).
pub struct HotplugMonitor {
    config: DiscoveryConfig,
    socket: Option<udev::MonitorSocket>,
}

impl HotplugMonitor {
    /// Create a monitor. Never fails; degrades to enumeration-only.
    pub fn new(config: DiscoveryConfig) -> Self {
        let socket = if config.hotplug {
            match Self::listen(&config) {
                Ok(socket) => Some(socket),
                Err(e) => {
                    warn!("{e}; no devices can be hotplugged");
                    None
                }
            }
        } else {
            info!("hotplug disabled by configuration");
            None
        };
        Self { config, socket }
    }

    fn listen(config: &DiscoveryConfig) -> Result<udev::MonitorSocket, DiscoveryError> {
        udev::MonitorBuilder::new()
            .and_then(|builder| builder.match_subsystem(&config.subsystem))
            .and_then(|builder| builder.listen())
            .map_err(DiscoveryError::Unavailable)
    }

    /// `true` if hotplug notifications will be delivered.
    pub fn is_monitoring(&self) -> bool {
        self.socket.is_some()
    }

    /// One-shot enumeration of already-connected joystick devices.
    pub fn scan_connected_devices(&self) -> Vec<String> {
        match self.enumerate() {
            Ok(devices) => devices,
            Err(e) => {
                warn!("{e}");
                Vec::new()
            }
        }
    }

    fn enumerate(&self) -> Result<Vec<String>, DiscoveryError> {
        let mut enumerator = udev::Enumerator::new().map_err(DiscoveryError::Enumeration)?;
        enumerator
            .match_subsystem(&self.config.subsystem)
            .map_err(DiscoveryError::Enumeration)?;
        enumerator
            .match_property(&self.config.joystick_property, "1")
            .map_err(DiscoveryError::Enumeration)?;

        let mut devices = Vec::new();
        for device in enumerator.scan_devices().map_err(DiscoveryError::Enumeration)? {
            let Some(node) = device.devnode().and_then(|p| p.to_str()) else {
                continue;
            };
            if node.starts_with(&self.config.device_prefix) {
                debug!("found connected joystick {node}");
                devices.push(node.to_string());
            }
        }
        Ok(devices)
    }

    /// Drain pending notifications. Returns immediately when there are none.
    pub fn poll(&mut self) -> Vec<HotplugEvent> {
        let Some(socket) = self.socket.as_ref() else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for event in socket.iter() {
            let action = Action::from(event.event_type());
            let devnode = event.devnode().and_then(|p| p.to_str());
            if let Some(hotplug) =
                classify(action, devnode, is_joystick(&event, &self.config), &self.config)
            {
                debug!("hotplug: {hotplug:?}");
                out.push(hotplug);
            }
        }
        out
    }

    pub fn raw_fd(&self) -> Option<RawFd> {
        self.socket.as_ref().map(|s| s.as_raw_fd())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DiscoveryConfig {
        DiscoveryConfig::default()
    }

    #[test]
    fn joystick_arrival_is_reported() {
        assert_eq!(
            classify(Action::Add, Some("/dev/input/event5"), true, &config()),
            Some(HotplugEvent::Detected("/dev/input/event5".into()))
        );
    }

    #[test]
    fn non_joystick_arrival_is_ignored() {
        assert_eq!(
            classify(Action::Add, Some("/dev/input/event2"), false, &config()),
            None
        );
    }

    #[test]
    fn removal_does_not_need_the_joystick_property() {
        assert_eq!(
            classify(Action::Remove, Some("/dev/input/event5"), false, &config()),
            Some(HotplugEvent::Removed("/dev/input/event5".into()))
        );
    }

    #[test]
    fn legacy_nodes_and_missing_nodes_are_ignored() {
        assert_eq!(classify(Action::Add, Some("/dev/input/js0"), true, &config()), None);
        assert_eq!(classify(Action::Add, None, true, &config()), None);
        assert_eq!(
            classify(Action::Other, Some("/dev/input/event5"), true, &config()),
            None
        );
    }
}
