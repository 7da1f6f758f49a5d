//! Input backends for `stickpad`.
//!
//! A [`Backend`] knows how to find devices, open them as [`Device`]s and report
//! hotplug changes. The [`DeviceManager`](crate::manager::DeviceManager) drives
//! it and never touches the OS directly.
//!
//! # Feature flags
//! - **`udev`**: Linux evdev readers + udev discovery (default).
//! - **`virtual`**: in-memory devices for tests and synthetic input (default).

use crate::config::Config;
use crate::device::Device;
use crate::error::DeviceOpenError;
use std::os::fd::RawFd;

#[cfg(all(feature = "udev", target_os = "linux"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "udev", target_os = "linux"))))]
pub mod linux;

#[cfg(feature = "virtual")]
#[cfg_attr(docsrs, doc(cfg(feature = "virtual")))]
pub mod virtual_input;

/// A device appeared or disappeared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HotplugEvent {
    Detected(String),
    Removed(String),
}

/// Source of devices and hotplug notifications.
pub trait Backend {
    /// Paths of qualifying devices that are already connected.
    fn scan(&mut self) -> Vec<String>;

    /// Open one device for reading.
    fn open(&mut self, path: &str) -> Result<Box<dyn Device>, DeviceOpenError>;

    /// Drain pending hotplug notifications. Never blocks.
    fn poll_hotplug(&mut self) -> Vec<HotplugEvent>;

    /// Descriptor that becomes readable when hotplug notifications are pending.
    fn hotplug_fd(&self) -> Option<RawFd> {
        None
    }
}

/// Platform backend for the current build.
///
/// Currently this is the evdev backend on Linux when `udev` is enabled.
pub fn platform_backend(config: &Config) -> Option<Box<dyn Backend>> {
    #[cfg(all(feature = "udev", target_os = "linux"))]
    {
        Some(Box::new(linux::EvdevBackend::new(
            config.discovery.clone(),
            config.reader.clone(),
        )))
    }

    #[cfg(not(all(feature = "udev", target_os = "linux")))]
    {
        let _ = config;
        log::warn!("no platform input backend compiled in");
        None
    }
}
