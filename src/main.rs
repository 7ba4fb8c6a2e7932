//! Demo application for redbus.
//!
//! Subscribes to a few events, publishes them, then runs one async publish.

use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use log::info;
use redbus::AsyncOutcome;
use redbus::EventBus;
use redbus::EventBusConfig;
use redbus::PayloadEvent;
use redbus::Subscriber;
use redbus::ext::PublishExt;
use redbus::impl_event;
use redbus::logging::setup_logging;
use tokio::sync::oneshot;

#[derive(Debug)]
struct CustomEvent {
    name: String,
}

impl_event!(CustomEvent);

struct CustomEventLogger;

impl Subscriber<CustomEvent> for CustomEventLogger {
    fn callback(&self, event: &CustomEvent) -> Result<()> {
        info!("Received CustomEvent \"{}\"", event.name);
        Ok(())
    }
}

fn main() -> Result<()> {
    dotenv().ok();
    setup_logging()?;

    let config = EventBusConfig::from_env()?;
    info!("Starting redbus demo with {:?}", config);
    let bus = EventBus::with_config(config);

    bus.subscribe(|event: &PayloadEvent<i32>| {
        info!("Received int payload {}", event.payload());
        Ok(())
    });
    let logger = Arc::new(CustomEventLogger);
    bus.subscribe_weak::<CustomEvent, _>(&logger);

    bus.publish(PayloadEvent::new(5))?;
    CustomEvent {
        name: "demo".to_string(),
    }
    .publish_to(&bus)?;

    let greeting = bus.subscribe(|event: &PayloadEvent<String>| {
        info!("{}", event.payload());
        Ok(())
    });
    bus.publish(PayloadEvent::new("Hello".to_string()))?;

    let (tx, rx) = oneshot::channel();
    bus.publish_async_with(PayloadEvent::new("Hello from a worker".to_string()), move |outcome| {
        let _ = tx.send(outcome);
    })?;
    match rx.blocking_recv()? {
        AsyncOutcome::Completed => info!("Async publish completed."),
        AsyncOutcome::Faulted(e) => info!("Async publish failed: {}", e),
        AsyncOutcome::Cancelled => info!("Async publish was cancelled."),
    }

    bus.unsubscribe(&greeting);
    drop(logger);
    // Both publishes below reach no one; the second prunes the weak logger.
    bus.publish(PayloadEvent::new("Unheard".to_string()))?;
    bus.publish(CustomEvent {
        name: "unheard".to_string(),
    })?;
    info!(
        "Remaining CustomEvent subscribers: {}",
        bus.subscriber_count::<CustomEvent>()
    );

    Ok(())
}
