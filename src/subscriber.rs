//! Handlers that receive published events.

use anyhow::Result;

/// Trait for event subscribers.
///
/// Closures of the shape `Fn(&E) -> anyhow::Result<()>` implement it
/// automatically, so both plain closures and stateful subscriber objects can
/// be registered on the bus.
pub trait Subscriber<E>: Send + Sync {
    /// Called when an event of type E is published.
    fn callback(&self, event: &E) -> Result<()>;
}

impl<E, F> Subscriber<E> for F
where
    F: Fn(&E) -> Result<()> + Send + Sync,
{
    fn callback(&self, event: &E) -> Result<()> {
        self(event)
    }
}
