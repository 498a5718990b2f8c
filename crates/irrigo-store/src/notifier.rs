//! Delivery of system events to an external notifier (usually a master station).

use irrigo_types::SystemEvent;

/// Receiver of system event chunks.
///
/// Delivery is fire-and-forget: the engine neither waits for nor retries a
/// delivery.
pub trait EventNotifier {
    fn deliver_system_event(&mut self, event: &SystemEvent);
}

/// Notifier that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl EventNotifier for NullNotifier {
    fn deliver_system_event(&mut self, _event: &SystemEvent) {}
}

/// Collects delivered chunks in order.
impl EventNotifier for Vec<SystemEvent> {
    fn deliver_system_event(&mut self, event: &SystemEvent) {
        self.push(event.clone());
    }
}

impl<T: EventNotifier + ?Sized> EventNotifier for &mut T {
    fn deliver_system_event(&mut self, event: &SystemEvent) {
        (**self).deliver_system_event(event)
    }
}
