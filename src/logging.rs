//! Diagnostic logging.
//!
//! Events go to standard error so they never interleave with command output. The level
//! is controlled by `RUST_LOG` and defaults to `warn`:
//! - `RUST_LOG=debug` - every dispatched command, spawn and history recall
//! - `RUST_LOG=trace` - also history evictions

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    if tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("logging already initialised");
    }
}
