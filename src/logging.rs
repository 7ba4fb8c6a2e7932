//! Logging setup and configuration.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::AppError;

/// Sets up console logging. `RUST_LOG` overrides the default `redbus=info`.
pub fn setup_logging() -> Result<(), AppError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("redbus=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stdout).with_ansi(true))
        .try_init()
        .map_err(|e| AppError::ConfigurationError {
            msg: format!("Failed to initialize logging: {}", e),
        })
}
