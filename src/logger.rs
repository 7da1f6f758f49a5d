use crate::event::Notification;
use crate::eventbus::InputListener;
use log::{debug, info};

/// A listener that writes every notification to the `log` facade.
///
/// Connects and disconnects go out at `info`, everything else at `debug`.
#[derive(Debug, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Logger
    }
}

impl InputListener for Logger {
    fn on_input(&mut self, event: &Notification) {
        match event {
            Notification::DeviceConnected { device } => info!("[Input] device {device} connected"),
            Notification::DeviceDisconnected { device } => {
                info!("[Input] device {device} disconnected")
            }
            Notification::Gamepad(ev) => debug!(
                "[Input] device {} {:?} 0x{:03x} = {} @{}us",
                ev.device_id(),
                ev.kind,
                ev.control,
                ev.value,
                ev.time
            ),
            other => debug!("[Input] {other:?}"),
        }
    }
}
