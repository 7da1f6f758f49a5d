//! Runtime configuration.
//!
//! Everything has a default, so an empty TOML document is a valid config:
//!
//! ```toml
//! [discovery]
//! device_prefix = "/dev/input/event"
//! hotplug = true
//!
//! [reader]
//! max_reads_per_wakeup = 8
//!
//! [[bindings]]
//! name = "default"
//!
//! [[bindings.bindings]]
//! action = "jump"
//! source = { GamepadButton = { button = 304, controller = 0 } }
//! ```

use crate::binding::BindingProfile;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where and how devices are discovered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// udev subsystem to enumerate and monitor.
    pub subsystem: String,
    /// udev property that must be `"1"` for a device to be picked up.
    pub joystick_property: String,
    /// Only device nodes with this prefix are opened.
    pub device_prefix: String,
    /// Subscribe to arrival/removal notifications.
    pub hotplug: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            subsystem: "input".into(),
            joystick_property: "ID_INPUT_JOYSTICK".into(),
            device_prefix: "/dev/input/event".into(),
            hotplug: true,
        }
    }
}

/// Per-device read limits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Upper bound on reads per readiness notification.
    pub max_reads_per_wakeup: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_reads_per_wakeup: 8,
        }
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub reader: ReaderConfig,
    /// Binding profiles applied, in order, when an [`InputHub`](crate::hub::InputHub) starts.
    pub bindings: Vec<BindingProfile>,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
