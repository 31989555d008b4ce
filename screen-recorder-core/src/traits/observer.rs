use std::sync::mpsc::Sender;

use crate::models::event::RecorderEvent;

/// Receiver of recorder notifications.
///
/// Observers are invoked inside the recorder's control critical section,
/// which is what keeps events in transition order. Implementations must
/// return quickly and must not call back into the recorder; hand the event
/// off to another thread (a channel is the usual choice) instead.
pub trait RecorderObserver: Send {
    /// Handle one event. Returning `false` unsubscribes the observer.
    fn on_event(&self, event: &RecorderEvent) -> bool;
}

impl RecorderObserver for Sender<RecorderEvent> {
    fn on_event(&self, event: &RecorderEvent) -> bool {
        self.send(event.clone()).is_ok()
    }
}
