//! Event types that can travel over the bus.

use std::any::Any;

pub mod event_bus;

/// Marker trait for events that can be dispatched through the event bus.
///
/// Types opt in explicitly, usually through [`impl_event!`](crate::impl_event).
/// Subscribers are keyed by the exact concrete type, so `PayloadEvent<i32>`
/// and `PayloadEvent<String>` never see each other's events.
pub trait Event: Any + Send + Sync + 'static {
    /// Downcast this event to a concrete type.
    ///
    /// Used internally by subscriptions to recover the concrete event from a
    /// trait object. Most users won't need to call this directly.
    fn as_any(&self) -> &dyn Any;

    /// Get the name of the event type.
    fn event_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Generic event carrying a single value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadEvent<T> {
    payload: T,
}

impl<T> PayloadEvent<T> {
    pub fn new(payload: T) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

impl<T: Send + Sync + 'static> Event for PayloadEvent<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
