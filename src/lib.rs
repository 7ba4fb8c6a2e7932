//! redbus - an in-process, typed publish/subscribe event bus.
//!
//! This crate provides:
//! - Subscriptions keyed by concrete event type, with strong or weak handlers
//! - Ordered synchronous fan-out and a fire-and-forget async wrapper
//! - A configurable policy for subscriber failures

pub mod config;
pub mod error;
pub mod event;
pub mod ext;
pub mod logging;
pub mod macros;
pub mod subscriber;
pub mod subscription;

pub use config::EventBusConfig;
pub use config::EventBusConfigBuilder;
pub use error::BusError;
pub use event::Event;
pub use event::PayloadEvent;
pub use event::event_bus::AsyncOutcome;
pub use event::event_bus::EventBus;
pub use subscriber::Subscriber;
pub use subscription::SubscriptionToken;
