//! Linux input backend.
//!
//! - **discovery**: udev enumeration + hotplug monitor
//! - **reader**: non-blocking `/dev/input/event*` reader and event classifier
//! - **calibration**: absolute axis range probing
//!
//! Most users should not touch these modules directly. Build an
//! [`InputHub`](crate::hub::InputHub) (or a [`DeviceManager`](crate::manager::DeviceManager))
//! with [`EvdevBackend`] and drive it from your event loop.

pub mod calibration;
pub mod discovery;
pub mod reader;

use crate::backends::{Backend, HotplugEvent};
use crate::config::{DiscoveryConfig, ReaderConfig};
use crate::device::Device;
use crate::error::DeviceOpenError;
use discovery::HotplugMonitor;
use reader::EvdevReader;
use std::os::fd::RawFd;

/// evdev + udev implementation of [`Backend`].
pub struct EvdevBackend {
    monitor: HotplugMonitor,
    reader: ReaderConfig,
}

impl EvdevBackend {
    pub fn new(discovery: DiscoveryConfig, reader: ReaderConfig) -> Self {
        Self {
            monitor: HotplugMonitor::new(discovery),
            reader,
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_monitoring()
    }
}

impl Backend for EvdevBackend {
    fn scan(&mut self) -> Vec<String> {
        self.monitor.scan_connected_devices()
    }

    fn open(&mut self, path: &str) -> Result<Box<dyn Device>, DeviceOpenError> {
        let reader = EvdevReader::open(path, &self.reader)?;
        Ok(Box::new(reader))
    }

    fn poll_hotplug(&mut self) -> Vec<HotplugEvent> {
        self.monitor.poll()
    }

    fn hotplug_fd(&self) -> Option<RawFd> {
        self.monitor.raw_fd()
    }
}
