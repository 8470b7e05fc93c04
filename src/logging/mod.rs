use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// Installs the global subscriber with default settings.
///
/// # Panics
/// Panics if a global subscriber is already set.
pub fn init_logging() {
    init_logging_with(&LoggingConfig::default()).expect("Failed to set global subscriber");
}

/// Installs the global subscriber. `RUST_LOG` wins over `cfg.filter`.
pub fn init_logging_with(cfg: &LoggingConfig) -> Result<(), SetGlobalDefaultError> {
    let filter: EnvFilter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.filter));

    let formatting_layer = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_target(true)
        .with_ansi(cfg.ansi)
        .compact();

    let subscriber = Registry::default().with(filter).with(formatting_layer);

    tracing::subscriber::set_global_default(subscriber)
}
