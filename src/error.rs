#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BusError {
    /// The error returned by a subscriber while the bus propagates failures.
    #[error(transparent)]
    Subscriber(anyhow::Error),

    #[error("Subscriber panicked: {message}")]
    SubscriberPanicked { message: String },

    #[error("Subscription received an event that is not `{expected}`")]
    TypeMismatch { expected: &'static str },

    #[error("Failed to start async publish worker: {0}")]
    WorkerUnavailable(#[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Invalid value \"{value}\" for config key \"{key}\"")]
    InvalidConfig { key: String, value: String },

    #[error("Configuration error: {msg}")]
    ConfigurationError { msg: String },
}
