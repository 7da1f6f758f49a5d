use crate::device::DeviceId;
use crate::event::Notification;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Trait for reacting to notifications published by the hub.
pub trait InputListener: Send {
    fn on_input(&mut self, event: &Notification);
}

impl<F> InputListener for F
where
    F: FnMut(&Notification) + Send,
{
    fn on_input(&mut self, event: &Notification) {
        self(event)
    }
}

/// Determines which kinds of notifications a listener wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFilter {
    All,
    /// Raw [`Notification::Gamepad`] events.
    GamepadOnly,
    ButtonsOnly,
    ActionsOnly,
    Custom(fn(&Notification) -> bool),
}

impl EventFilter {
    pub fn accepts(&self, event: &Notification) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::GamepadOnly => matches!(event, Notification::Gamepad(_)),
            EventFilter::ButtonsOnly => matches!(
                event,
                Notification::ButtonPressed { .. } | Notification::ButtonReleased { .. }
            ),
            EventFilter::ActionsOnly => matches!(
                event,
                Notification::ActionActivated(_) | Notification::ActionDeactivated(_)
            ),
            EventFilter::Custom(f) => f(event),
        }
    }
}

/// Metadata-wrapped listener with filters and control flags.
struct ListenerEntry {
    listener: Box<dyn InputListener>,
    enabled: bool,
    filter: EventFilter,
    /// Only deliver notifications about this device.
    device: Option<DeviceId>,
}

/// Listener registry. Delivery order is registration order.
#[derive(Default)]
pub struct InputEventBus {
    next_id: u64,
    listeners: BTreeMap<u64, ListenerEntry>,
}

impl InputEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener with a filter and an optional device tag.
    ///
    /// A tagged listener only sees notifications that name its device;
    /// device-less ones (`StateUpdated`, action edges) are skipped.
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
        device: Option<DeviceId>,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                device,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: u64) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Emits one notification to all active and matching listeners.
    pub fn emit(&mut self, event: &Notification) {
        for entry in self.listeners.values_mut() {
            if !entry.enabled {
                continue;
            }

            if let Some(wanted) = entry.device {
                if event.device_id() != Some(wanted) {
                    continue;
                }
            }

            if entry.filter.accepts(event) {
                entry.listener.on_input(event);
            }
        }
    }

    /// Emits a batch of notifications to matching listeners.
    pub fn emit_all(&mut self, events: &[Notification]) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Listener that appends every notification to a shared queue.
///
/// Clone it before registering to keep a handle for reading.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything recorded so far.
    pub fn drain(&self) -> Vec<Notification> {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *events)
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InputListener for Recorder {
    fn on_input(&mut self, event: &Notification) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Notification> {
        vec![
            Notification::DeviceConnected { device: 1 },
            Notification::ButtonPressed {
                button: 0x130,
                device: 1,
            },
            Notification::ButtonReleased {
                button: 0x130,
                device: 2,
            },
            Notification::StateUpdated,
            Notification::ActionActivated("jump".into()),
        ]
    }

    #[test]
    fn filters_select_notification_kinds() {
        let mut bus = InputEventBus::new();
        let buttons = Recorder::new();
        let actions = Recorder::new();
        bus.add_listener(buttons.clone(), EventFilter::ButtonsOnly, None);
        bus.add_listener(actions.clone(), EventFilter::ActionsOnly, None);

        bus.emit_all(&sample());
        assert_eq!(buttons.len(), 2);
        assert!(matches!(
            actions.drain().as_slice(),
            [Notification::ActionActivated(name)] if name == "jump"
        ));
    }

    #[test]
    fn device_tag_limits_delivery() {
        let mut bus = InputEventBus::new();
        let recorder = Recorder::new();
        bus.add_listener(recorder.clone(), EventFilter::All, Some(1));

        bus.emit_all(&sample());
        let seen = recorder.drain();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|n| n.device_id() == Some(1)));
    }

    #[test]
    fn disabled_and_removed_listeners_are_skipped() {
        let mut bus = InputEventBus::new();
        let recorder = Recorder::new();
        let id = bus.add_listener(recorder.clone(), EventFilter::All, None);

        bus.disable(id);
        bus.emit(&Notification::StateUpdated);
        assert!(recorder.is_empty());

        bus.enable(id);
        bus.emit(&Notification::StateUpdated);
        assert_eq!(recorder.len(), 1);

        assert!(bus.remove_listener(id));
        assert!(!bus.remove_listener(id));
        bus.emit(&Notification::StateUpdated);
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn closures_and_custom_filters() {
        fn only_connects(n: &Notification) -> bool {
            matches!(n, Notification::DeviceConnected { .. })
        }

        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let mut bus = InputEventBus::new();
        bus.add_listener(
            move |_: &Notification| *counter.lock().unwrap() += 1,
            EventFilter::Custom(only_connects),
            None,
        );

        bus.emit_all(&sample());
        assert_eq!(*count.lock().unwrap(), 1);
    }
}
