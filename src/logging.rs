//! Tracing subscriber setup for binaries embedding the runner.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! up to the application. This helper covers the common case.

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `level`. Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
