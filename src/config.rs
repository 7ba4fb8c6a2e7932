//! Bus configuration.

use derive_builder::Builder;

use crate::error::AppError;

pub const THROW_SUBSCRIBER_EXCEPTION_KEY: &str = "REDBUS_THROW_SUBSCRIBER_EXCEPTION";
pub const ASYNC_WORKERS_KEY: &str = "REDBUS_ASYNC_WORKERS";

/// Options fixed at bus construction.
#[derive(Builder, Clone, Debug, PartialEq, Eq)]
#[builder(pattern = "immutable", default)]
pub struct EventBusConfig {
    /// When `false` (the default) a failing subscriber is logged and skipped.
    /// When `true` the first failure stops the fan-out and is returned to
    /// the publisher, so later subscribers do not receive the event.
    pub throw_subscriber_exception: bool,
    /// Upper bound on the worker threads running `publish_async` calls.
    pub async_workers: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            throw_subscriber_exception: false,
            async_workers: 4,
        }
    }
}

impl EventBusConfig {
    /// Reads the configuration from the environment, falling back to the
    /// defaults for unset keys.
    pub fn from_env() -> Result<Self, AppError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var(THROW_SUBSCRIBER_EXCEPTION_KEY) {
            config.throw_subscriber_exception = parse_bool(THROW_SUBSCRIBER_EXCEPTION_KEY, &value)?;
        }

        if let Ok(value) = std::env::var(ASYNC_WORKERS_KEY) {
            config.async_workers = match value.trim().parse::<usize>() {
                Ok(workers) if workers > 0 => workers,
                _ => return Err(invalid(ASYNC_WORKERS_KEY, &value)),
            };
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> AppError {
    AppError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        // SAFETY: tests touching the environment are serialized.
        unsafe {
            std::env::remove_var(THROW_SUBSCRIBER_EXCEPTION_KEY);
            std::env::remove_var(ASYNC_WORKERS_KEY);
        }
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: tests touching the environment are serialized.
        unsafe { std::env::set_var(key, value) };
    }

    #[test]
    fn test_builder_defaults() {
        let config = EventBusConfigBuilder::default().build().unwrap();
        assert_eq!(config, EventBusConfig::default());
        assert!(!config.throw_subscriber_exception);

        let config = EventBusConfigBuilder::default()
            .throw_subscriber_exception(true)
            .build()
            .unwrap();
        assert!(config.throw_subscriber_exception);
        assert_eq!(config.async_workers, 4);
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_defaults_when_unset() {
        clear_env();
        assert_eq!(EventBusConfig::from_env().unwrap(), EventBusConfig::default());
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_reads_values() {
        clear_env();
        set_env(THROW_SUBSCRIBER_EXCEPTION_KEY, "TRUE");
        set_env(ASYNC_WORKERS_KEY, " 2 ");

        let config = EventBusConfig::from_env().unwrap();
        assert!(config.throw_subscriber_exception);
        assert_eq!(config.async_workers, 2);
        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_rejects_malformed_values() {
        clear_env();
        set_env(THROW_SUBSCRIBER_EXCEPTION_KEY, "sometimes");
        assert!(matches!(
            EventBusConfig::from_env(),
            Err(AppError::InvalidConfig { ref key, .. }) if key == THROW_SUBSCRIBER_EXCEPTION_KEY
        ));

        clear_env();
        set_env(ASYNC_WORKERS_KEY, "0");
        assert!(matches!(
            EventBusConfig::from_env(),
            Err(AppError::InvalidConfig { ref key, .. }) if key == ASYNC_WORKERS_KEY
        ));
        clear_env();
    }
}
