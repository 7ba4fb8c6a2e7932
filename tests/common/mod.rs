//! Common test events and helpers.

use std::sync::Arc;
use std::sync::Mutex;

use mockall::mock;
use redbus::PayloadEvent;
use redbus::Subscriber;
use redbus::impl_event;

/// User-defined event used across the integration tests.
#[derive(Clone, Debug, PartialEq)]
#[allow(dead_code)]
pub struct CustomTestEvent {
    pub name: String,
    pub identifier: i32,
}

impl CustomTestEvent {
    #[allow(dead_code)]
    pub fn new(name: &str, identifier: i32) -> Self {
        Self {
            name: name.to_string(),
            identifier,
        }
    }
}

/// Event type nobody in the tests subscribes to.
#[derive(Debug)]
#[allow(dead_code)]
pub struct UnrelatedEvent;

impl_event!(CustomTestEvent, UnrelatedEvent);

mock! {
    pub IntListener {}

    impl Subscriber<PayloadEvent<i32>> for IntListener {
        fn callback(&self, event: &PayloadEvent<i32>) -> anyhow::Result<()>;
    }
}

/// Shared list subscribers append to, so tests can check delivery order.
pub type Recorder<T> = Arc<Mutex<Vec<T>>>;

#[allow(dead_code)]
pub fn recorder<T>() -> Recorder<T> {
    Arc::new(Mutex::new(Vec::new()))
}

#[allow(dead_code)]
pub fn recorded<T: Clone>(recorder: &Recorder<T>) -> Vec<T> {
    recorder.lock().unwrap().clone()
}
