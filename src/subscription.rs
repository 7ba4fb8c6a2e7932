//! Subscription tokens and the per-handler delivery unit.

use std::any::TypeId;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;
use std::sync::Weak;

use uuid::Uuid;

use crate::event::Event;
use crate::subscriber::Subscriber;

/// Handle returned from subscribing, passed back to unsubscribe.
///
/// Two tokens are equal when they were issued by the same subscribe call.
#[derive(Clone)]
pub struct SubscriptionToken {
    id: Uuid,
    event_type: TypeId,
    event_name: &'static str,
}

impl SubscriptionToken {
    pub(crate) fn new<E: Event>() -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type: TypeId::of::<E>(),
            event_name: std::any::type_name::<E>(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event_type(&self) -> TypeId {
        self.event_type
    }

    pub fn event_name(&self) -> &'static str {
        self.event_name
    }
}

impl PartialEq for SubscriptionToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SubscriptionToken {}

impl Hash for SubscriptionToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for SubscriptionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionToken")
            .field("id", &self.id)
            .field("event", &self.event_name)
            .finish()
    }
}

/// Why a single delivery did not complete.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DeliveryError {
    #[error("Subscription received an event that is not `{expected}`")]
    TypeMismatch { expected: &'static str },

    #[error("Subscriber for {0:?} has been dropped")]
    Expired(SubscriptionToken),

    #[error(transparent)]
    Handler(anyhow::Error),
}

pub(crate) trait Subscription: Send + Sync {
    fn token(&self) -> &SubscriptionToken;

    fn publish(&self, event: &dyn Event) -> Result<(), DeliveryError>;
}

enum Handler<E> {
    Strong(Arc<dyn Subscriber<E>>),
    Weak(Weak<dyn Subscriber<E>>),
}

pub(crate) struct TypedSubscription<E> {
    token: SubscriptionToken,
    handler: Handler<E>,
}

impl<E: Event> TypedSubscription<E> {
    pub(crate) fn strong(subscriber: Arc<dyn Subscriber<E>>) -> Self {
        Self::with_handler(Handler::Strong(subscriber))
    }

    pub(crate) fn weak(subscriber: Weak<dyn Subscriber<E>>) -> Self {
        Self::with_handler(Handler::Weak(subscriber))
    }

    fn with_handler(handler: Handler<E>) -> Self {
        Self {
            token: SubscriptionToken::new::<E>(),
            handler,
        }
    }
}

impl<E: Event> Subscription for TypedSubscription<E> {
    fn token(&self) -> &SubscriptionToken {
        &self.token
    }

    fn publish(&self, event: &dyn Event) -> Result<(), DeliveryError> {
        let event = event
            .as_any()
            .downcast_ref::<E>()
            .ok_or(DeliveryError::TypeMismatch {
                expected: self.token.event_name,
            })?;

        let result = match &self.handler {
            Handler::Strong(subscriber) => subscriber.callback(event),
            Handler::Weak(subscriber) => match subscriber.upgrade() {
                Some(subscriber) => subscriber.callback(event),
                None => return Err(DeliveryError::Expired(self.token.clone())),
            },
        };
        result.map_err(DeliveryError::Handler)
    }
}
