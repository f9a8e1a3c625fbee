// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info")) // Default to INFO level
}

/// Sets up the logging framework using tracing_subscriber.
/// Reads log level filters from the `RUST_LOG` environment variable.
/// Defaults to "info" if `RUST_LOG` is not set.
///
/// Panics if a global subscriber is already installed; embedding callers
/// should prefer [`try_setup_logging`].
pub fn setup_logging() {
    fmt()
        .with_env_filter(default_filter())
        .init();

    tracing::debug!("Logging setup complete.");
}

/// Same as [`setup_logging`], but returns `false` instead of panicking when a
/// subscriber is already installed (e.g. by the host application or another test).
pub fn try_setup_logging() -> bool {
    let installed = fmt()
        .with_env_filter(default_filter())
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("Logging setup complete.");
    }
    installed
}
