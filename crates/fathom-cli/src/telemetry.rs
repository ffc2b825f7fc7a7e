//! Structured logging initialisation.

use std::io::{self, IsTerminal};

use fathom_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

static TELEMETRY_GUARD: OnceCell<()> = OnceCell::new();

/// Errors encountered while configuring logging.
#[derive(Debug, thiserror::Error)]
pub(crate) enum TelemetryError {
    /// The configured filter expression does not parse.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global subscriber on first use; later calls are no-ops.
pub(crate) fn initialise(config: &Config) -> Result<(), TelemetryError> {
    TELEMETRY_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| ())
}

fn install_subscriber(config: &Config) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = |env_filter: EnvFilter| {
        fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_level(true)
            .with_writer(io::stderr)
            .with_ansi(io::stderr().is_terminal())
            .with_timer(fmt::time::UtcTime::rfc_3339())
    };

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder(filter).json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder(filter).compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_filters_are_rejected() {
        let config = Config {
            log_filter: String::from("fathom=notalevel"),
            ..Config::default()
        };
        let error = install_subscriber(&config).expect_err("filter should fail");
        assert!(matches!(error, TelemetryError::Filter(_)), "{error}");
    }
}
