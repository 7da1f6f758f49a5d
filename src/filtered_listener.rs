use crate::event::Notification;
use crate::eventbus::InputListener;

/// Wraps a listener and filters notifications based on a user-supplied predicate.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&Notification) -> bool + Send + Sync>,
    inner: Box<dyn InputListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&Notification) -> bool + Send + Sync + 'static,
        inner: impl InputListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }
}

impl InputListener for FilteredListener {
    fn on_input(&mut self, event: &Notification) {
        if (self.predicate)(event) {
            self.inner.on_input(event);
        }
    }
}
