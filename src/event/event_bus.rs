use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use log::debug;
use log::trace;
use log::warn;
use parking_lot::Mutex;
use tokio::runtime;

use crate::config::EventBusConfig;
use crate::error::BusError;
use crate::event::Event;
use crate::subscriber::Subscriber;
use crate::subscription::DeliveryError;
use crate::subscription::Subscription;
use crate::subscription::SubscriptionToken;
use crate::subscription::TypedSubscription;

type Subscriptions = HashMap<TypeId, Vec<Arc<dyn Subscription>>>;
type CompletionCallback = Box<dyn FnOnce(AsyncOutcome) + Send>;

/// Result handed to the completion callback of an async publish.
#[derive(Debug)]
pub enum AsyncOutcome {
    /// Every subscriber in the snapshot was visited.
    Completed,
    /// A subscriber failed while the bus propagates subscriber failures.
    Faulted(BusError),
    /// The worker shut down before the publish ran.
    Cancelled,
}

pub struct EventBus {
    registry: Arc<Registry>,
    worker: Mutex<Option<runtime::Runtime>>,
}

struct Registry {
    config: EventBusConfig,
    subscriptions: Mutex<Subscriptions>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            registry: Arc::new(Registry {
                config,
                subscriptions: Mutex::new(HashMap::new()),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.registry.config
    }

    /// Subscribes `handler` to events of type `E`.
    ///
    /// The bus keeps the handler alive until the returned token is passed to
    /// [`unsubscribe`](Self::unsubscribe).
    pub fn subscribe<E, F>(&self, handler: F) -> SubscriptionToken
    where
        E: Event,
        F: Fn(&E) -> Result<()> + Send + Sync + 'static,
    {
        self.register_subscriber::<E, F>(Arc::new(handler))
    }

    /// Subscribes a shared subscriber object to events of type `E`.
    pub fn register_subscriber<E, S>(&self, subscriber: Arc<S>) -> SubscriptionToken
    where
        E: Event,
        S: Subscriber<E> + 'static,
    {
        let subscriber: Arc<dyn Subscriber<E>> = subscriber;
        self.insert(TypedSubscription::strong(subscriber))
    }

    /// Subscribes without keeping `subscriber` alive.
    ///
    /// Once every other `Arc` to the subscriber is dropped, the next publish
    /// of `E` skips it and removes the subscription from the bus.
    pub fn subscribe_weak<E, S>(&self, subscriber: &Arc<S>) -> SubscriptionToken
    where
        E: Event,
        S: Subscriber<E> + 'static,
    {
        let subscriber: Arc<dyn Subscriber<E>> = subscriber.clone();
        self.insert(TypedSubscription::weak(Arc::downgrade(&subscriber)))
    }

    /// Removes the subscription identified by `token`.
    ///
    /// Unknown or already removed tokens are ignored.
    pub fn unsubscribe(&self, token: &SubscriptionToken) {
        let mut subscriptions = self.registry.subscriptions.lock();
        let Some(list) = subscriptions.get_mut(&token.event_type()) else {
            return;
        };

        if let Some(index) = list.iter().position(|s| s.token() == token) {
            list.remove(index);
            debug!("Unsubscribed {:?}", token);
        }
        if list.is_empty() {
            subscriptions.remove(&token.event_type());
        }
    }

    /// Delivers `event` to every subscriber of `E`, in subscription order, on
    /// the calling thread.
    ///
    /// Subscribers added or removed while the event is being delivered do
    /// not change who receives it. With the default configuration subscriber
    /// failures are logged and skipped; with
    /// [`throw_subscriber_exception`](EventBusConfig::throw_subscriber_exception)
    /// the first failing subscriber stops the fan-out and its error is
    /// returned (a panic is resumed on the caller).
    pub fn publish<E: Event>(&self, event: E) -> Result<(), BusError> {
        self.registry.publish(TypeId::of::<E>(), &event)
    }

    /// Publishes `event` on a worker thread without waiting for subscribers.
    pub fn publish_async<E: Event>(&self, event: E) -> Result<(), BusError> {
        self.spawn_publish(event, None)
    }

    /// Like [`publish_async`](Self::publish_async), calling `on_complete`
    /// exactly once with the outcome.
    ///
    /// If the worker cannot be started the error is returned and
    /// `on_complete` is not called.
    pub fn publish_async_with<E, C>(&self, event: E, on_complete: C) -> Result<(), BusError>
    where
        E: Event,
        C: FnOnce(AsyncOutcome) + Send + 'static,
    {
        self.spawn_publish(event, Some(Box::new(on_complete)))
    }

    /// Number of subscriptions currently registered for `E`.
    ///
    /// Weak subscriptions whose subscriber is gone are counted until the
    /// next publish of `E` prunes them.
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.registry
            .subscriptions
            .lock()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    fn insert<E: Event>(&self, subscription: TypedSubscription<E>) -> SubscriptionToken {
        let token = subscription.token().clone();
        self.registry
            .subscriptions
            .lock()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Arc::new(subscription));
        debug!("Subscribed {:?}", token);
        token
    }

    fn spawn_publish<E: Event>(
        &self,
        event: E,
        on_complete: Option<CompletionCallback>,
    ) -> Result<(), BusError> {
        let handle = self.worker_handle()?;
        let registry = self.registry.clone();
        let completion = Completion(on_complete);

        handle.spawn_blocking(move || {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                registry.publish(TypeId::of::<E>(), &event)
            }));
            completion.finish(match result {
                Ok(Ok(())) => AsyncOutcome::Completed,
                Ok(Err(e)) => AsyncOutcome::Faulted(e),
                Err(payload) => AsyncOutcome::Faulted(BusError::SubscriberPanicked {
                    message: panic_message(&*payload),
                }),
            });
        });
        Ok(())
    }

    fn worker_handle(&self) -> Result<runtime::Handle, BusError> {
        let mut worker = self.worker.lock();
        if let Some(rt) = &*worker {
            return Ok(rt.handle().clone());
        }

        let rt = runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(self.registry.config.async_workers.max(1))
            .thread_name("redbus-worker")
            .build()
            .map_err(BusError::WorkerUnavailable)?;
        debug!(
            "Started async publish worker with {} thread(s)",
            self.registry.config.async_workers.max(1)
        );
        let handle = rt.handle().clone();
        *worker = Some(rt);
        Ok(handle)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        if let Some(rt) = self.worker.get_mut().take() {
            rt.shutdown_background();
        }
    }
}

impl Registry {
    fn publish(&self, type_id: TypeId, event: &dyn Event) -> Result<(), BusError> {
        let snapshot = self.snapshot(type_id);
        trace!(
            "Publishing {} to {} subscriber(s)",
            event.event_name(),
            snapshot.len()
        );

        let mut expired = Vec::new();
        let mut outcome = Ok(());
        for subscription in &snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| subscription.publish(event))) {
                Ok(Ok(())) => {}
                Ok(Err(DeliveryError::Expired(token))) => expired.push(token),
                Ok(Err(DeliveryError::TypeMismatch { expected })) => {
                    outcome = Err(BusError::TypeMismatch { expected });
                    break;
                }
                Ok(Err(DeliveryError::Handler(e))) => {
                    if self.config.throw_subscriber_exception {
                        outcome = Err(BusError::Subscriber(e));
                        break;
                    }
                    warn!(
                        "Subscriber {} failed handling {}: {:#}",
                        subscription.token().id(),
                        event.event_name(),
                        e
                    );
                }
                Err(payload) => {
                    if self.config.throw_subscriber_exception {
                        self.prune(type_id, &expired);
                        panic::resume_unwind(payload);
                    }
                    warn!(
                        "Subscriber {} panicked handling {}: {}",
                        subscription.token().id(),
                        event.event_name(),
                        panic_message(&*payload)
                    );
                }
            }
        }

        self.prune(type_id, &expired);
        outcome
    }

    fn snapshot(&self, type_id: TypeId) -> Vec<Arc<dyn Subscription>> {
        self.subscriptions
            .lock()
            .get(&type_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Removes exactly the given expired subscriptions, leaving anything
    /// registered since the snapshot in place.
    fn prune(&self, type_id: TypeId, expired: &[SubscriptionToken]) {
        if expired.is_empty() {
            return;
        }

        let mut subscriptions = self.subscriptions.lock();
        if let Some(list) = subscriptions.get_mut(&type_id) {
            list.retain(|s| !expired.contains(s.token()));
            if list.is_empty() {
                subscriptions.remove(&type_id);
            }
        }
        debug!("Pruned {} expired subscription(s)", expired.len());
    }
}

/// Fires the completion callback once, reporting `Cancelled` if the publish
/// is dropped before it runs.
struct Completion(Option<CompletionCallback>);

impl Completion {
    fn finish(mut self, outcome: AsyncOutcome) {
        if let Some(callback) = self.0.take() {
            callback(outcome);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(callback) = self.0.take() {
            callback(AsyncOutcome::Cancelled);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
