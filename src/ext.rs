//! Fluent helpers so events and tokens can address a bus directly.

use crate::error::BusError;
use crate::event::Event;
use crate::event::event_bus::AsyncOutcome;
use crate::event::event_bus::EventBus;
use crate::subscription::SubscriptionToken;

pub trait PublishExt: Event + Sized {
    fn publish_to(self, bus: &EventBus) -> Result<(), BusError> {
        bus.publish(self)
    }

    fn publish_async_to(self, bus: &EventBus) -> Result<(), BusError> {
        bus.publish_async(self)
    }

    fn publish_async_to_with<C>(self, bus: &EventBus, on_complete: C) -> Result<(), BusError>
    where
        C: FnOnce(AsyncOutcome) + Send + 'static,
    {
        bus.publish_async_with(self, on_complete)
    }
}

impl<E: Event> PublishExt for E {}

pub trait UnsubscribeExt {
    fn unsubscribe_from(&self, bus: &EventBus);
}

impl UnsubscribeExt for SubscriptionToken {
    fn unsubscribe_from(&self, bus: &EventBus) {
        bus.unsubscribe(self);
    }
}
